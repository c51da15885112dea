//! Wire types shared with the turntable server's HTTP API.
//!
//! Field names here are the JSON field names the server reads and writes,
//! so renaming any of them is a protocol change.

pub mod api;
