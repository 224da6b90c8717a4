//! Dispatch Integration Tests
//!
//! The transport-facing surface: the process-global dispatcher, request and
//! response encoding, and configuration files.

#[path = "../common/mod.rs"]
mod common;

mod config;
mod global;
mod transport;
