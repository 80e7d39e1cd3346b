//! Error types for the editor engine
//!
//! Defines the error hierarchy for engine operations. Everything here
//! degrades locally: api-layer callers convert these into JsValue error
//! strings, and nothing is allowed to panic across the WASM boundary.

use thiserror::Error;

/// Top-level engine error type
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// No editor session is registered under the given instance id
    #[error("Unknown editor instance: {0}")]
    UnknownInstance(String),

    /// The global session registry mutex was poisoned
    #[error("Editor registry lock poisoned")]
    LockPoisoned,

    /// A payload coming from the host did not match the expected shape
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// The markdown transform rejected its input
    #[error("Render transform failed: {0}")]
    Transform(#[from] TransformError),

    /// A bus subscriber reported a failure (isolated, diagnostic only)
    #[error("Bus subscriber failed: {0}")]
    Subscriber(String),
}

/// Errors produced by a markdown-to-HTML transform implementation
#[derive(Debug, Clone, Error)]
pub enum TransformError {
    /// Input the transform cannot process
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Internal transform error (should be rare, indicates a bug)
    #[error("Internal transform error: {0}")]
    Internal(String),
}
