//! Shared types and ID generation for the watchpost workspace.

pub mod id;
pub mod types;
