//! Unified error types for tilemap_engine

use thiserror::Error;

/// Main error type for tilemap_engine operations.
///
/// Only structural decode failures are errors: a malformed header aborts
/// the decode of that single artifact. Recoverable conditions (skipped
/// property tokens, rejected connections, empty undo history) are not
/// represented here - they surface as warnings or boolean results.
#[derive(Debug, Error)]
pub enum EngineError {
    // === I/O Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Decoding Errors ===
    #[error("Artifact is empty")]
    EmptyArtifact,

    #[error("Invalid map header: '{line}'")]
    InvalidHeader { line: String },

    #[error("Invalid map size token: '{token}'")]
    InvalidSize { token: String },

    #[error("Map size {width}x{height} exceeds limits")]
    SizeOutOfBounds { width: i32, height: i32 },

    #[error("Dictionary is missing the import manifest line")]
    MissingManifest,

    #[error("{0}")]
    Generic(String),
}

/// Result type alias for tilemap_engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// Create a generic error from any displayable type
    pub fn generic(msg: impl std::fmt::Display) -> Self {
        Self::Generic(msg.to_string())
    }

    pub fn invalid_header(line: impl Into<String>) -> Self {
        Self::InvalidHeader { line: line.into() }
    }

    pub fn invalid_size(token: impl Into<String>) -> Self {
        Self::InvalidSize { token: token.into() }
    }
}
