//! Configuration module
//!
//! - Data directory resolution
//! - Persisted settings, including the engine's unassign and transfer policies

pub mod paths;
pub mod settings;

pub use paths::EnvelopePaths;
pub use settings::{Settings, UnassignPolicy};
