//! Minislot daemon library - exposes modules for testing.

pub mod config;
pub mod control_plane;
pub mod deploy;
pub mod manifest;
pub mod routes;
pub mod server;
pub mod submitter;
pub mod template;
