//! Configuration module for the acquisition layer
//!
//! This module provides the `AcquireConfig` struct and its type-safe builder
//! with validation and sensible defaults.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod methods;
pub mod types;

// Re-exports for public API
pub use builder::{AcquireConfigBuilder, WithBackendUrl};
pub use types::AcquireConfig;
