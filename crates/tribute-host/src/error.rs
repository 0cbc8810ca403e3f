//! Error types for the terminal host.
//!
//! [`HostError`] is the top-level error type that wraps every failure the
//! host can hit between startup and teardown.

/// Top-level error for the terminal host.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: tribute_core::config::ConfigError,
    },

    /// The view could not be mounted.
    #[error("view error: {source}")]
    View {
        /// The underlying view error.
        #[from]
        source: tribute_core::view::ViewError,
    },

    /// Reading stdin or writing stdout failed.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A snapshot could not be serialized.
    #[error("JSON error: {source}")]
    Json {
        /// The underlying serde error.
        #[from]
        source: serde_json::Error,
    },
}
