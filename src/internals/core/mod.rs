pub mod command_gate;
pub mod coordinator;
pub mod dashboard;
pub mod jog;
pub mod notifier;
pub mod poller;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;
