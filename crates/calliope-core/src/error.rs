//! Error types for the control surface
//!
//! Every violated precondition surfaces synchronously at the call site and
//! propagates to the caller unretried; messages name the violated constraint
//! and the offending values.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the control surface
#[derive(Debug, Error)]
pub enum SynthError {
    /// An id outside the fixed control-group or mod-source enumeration was
    /// passed to a catalog lookup
    #[error("unknown {kind} id {id}")]
    NotFound { kind: &'static str, id: i32 },

    /// Render buffer failed element-size / dimension / shape validation
    #[error("invalid render buffer shape: {reason}")]
    InvalidShape { reason: String },

    /// Block window exceeds the render buffer's capacity
    #[error("render range out of bounds: {reason}")]
    OutOfRange { reason: String },

    /// Patch path missing on load
    #[error("patch file not found: {}", path.display())]
    PatchNotFound { path: PathBuf },

    /// Engine-side patch IO failure
    #[error("patch IO failed for '{}': {reason}", path.display())]
    PatchIo { path: PathBuf, reason: String },
}

/// Result type for control-surface operations
pub type SynthResult<T> = Result<T, SynthError>;
