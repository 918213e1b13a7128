//! Configuration module for jukegate
//!
//! This module contains the application settings structure and path management.

mod paths;
mod settings;

pub use paths::Paths;
pub use settings::{ProviderEntry, Settings};
