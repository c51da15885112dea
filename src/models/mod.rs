pub mod command;
pub mod jog;
pub mod notification;
pub mod poll_spec;
pub mod snapshot;
