//! Minislotctl library - exposes modules for integration tests

pub mod cli;
pub mod client;
