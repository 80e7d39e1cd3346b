//! Data model for the markdown editor engine
//!
//! Core state types shared across the engine: selections, display
//! settings, instance options, and the editor state itself.

pub mod core;
pub mod editor_state;

// Re-export commonly used types
pub use self::core::*;
pub use editor_state::EditorState;
