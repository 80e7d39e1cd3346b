//! Utility modules for the Markdown Editor
//!
//! This module contains small shared helpers used across the engine:
//! host-clock debounce scheduling and HTML escaping.

pub mod debounce;
pub mod escape;

// Re-export commonly used types
pub use debounce::*;
pub use escape::*;
