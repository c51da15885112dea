pub mod config;
pub mod error;
pub mod externals;
pub mod internals;
pub mod models;
