//! Error types for the Armory engine binary.
//!
//! [`EngineError`] wraps every failure mode of a batch run so `main` can
//! propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Generator configuration could not be loaded.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: armory_gen::ConfigError,
    },

    /// An agent could not be generated.
    #[error("generation error: {source}")]
    Generation {
        /// The underlying generation error.
        #[from]
        source: armory_gen::GenerationError,
    },

    /// Output could not be serialized.
    #[error("serialization error: {source}")]
    Serialize {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The `engine` section of the config file is malformed.
    #[error("batch config error: {message}")]
    Batch {
        /// Description of the failure.
        message: String,
    },
}
