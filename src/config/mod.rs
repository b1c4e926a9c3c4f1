//! Configuration module for fintrack
//!
//! This module provides configuration management including:
//! - Platform path resolution with an env-var override
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::LedgerPaths;
pub use settings::Settings;
