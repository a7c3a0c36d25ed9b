//! Error types for the benchmark harness.
//!
//! The evaluation engine itself never fails; these errors come from the
//! extractor adapters, file I/O and the drivers around them.

use std::path::PathBuf;

/// Result type alias for harness operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting, loading or saving tables.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport error talking to a hosted API
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// An API key the method needs is not configured
    #[error("API key required for {method}: set {env_var}")]
    MissingCredential {
        /// Method that needed the key
        method: String,
        /// Environment variable that should hold it
        env_var: &'static str,
    },

    /// An external program is not installed
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Rendering a PDF page to an image failed
    #[error("Could not convert page {page}: {reason}")]
    Rasterize {
        /// 1-indexed page number
        page: u32,
        /// Reason reported by the rasterizer
        reason: String,
    },

    /// Hosted API answered with a non-success status
    #[error("{provider} API error ({status}): {message}")]
    Api {
        /// Provider name
        provider: &'static str,
        /// HTTP status code
        status: u16,
        /// Response body or error message
        message: String,
    },

    /// Model output did not contain the expected table JSON
    #[error("Unexpected response format: {0}")]
    ResponseFormat(String),

    /// Saved extraction output for a replayed method does not exist
    #[error("No saved extraction output at {}", .0.display())]
    MissingOutput(PathBuf),

    /// Method name is not known
    #[error("Unknown extraction method: {0}")]
    UnknownMethod(String),

    /// Method is known but cannot run with the detected capabilities
    #[error("Method {method} is not available: {reason}")]
    Unavailable {
        /// Method name
        method: String,
        /// Why it cannot run
        reason: String,
    },

    /// Dataset manifest is malformed
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),
}
