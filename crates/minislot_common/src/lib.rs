//! Minislot Common - Shared types for the deployment daemon and its CLI
//!
//! The tier catalog lives here so that `minislotctl` can reject a bad tier
//! before making a network call, using exactly the table `minislotd` renders with.

pub mod schemas;
pub mod tiers;

pub use schemas::*;
pub use tiers::*;
