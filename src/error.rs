//! Error types for the bsvalias client

use thiserror::Error;

/// Result type alias for bsvalias operations
pub type Result<T> = std::result::Result<T, BsvaliasError>;

/// Main error type for bsvalias operations
#[derive(Error, Debug)]
pub enum BsvaliasError {
    /// The counterparty site does not advertise the capability
    #[error("Not capable: {capability}")]
    NotCapable { capability: String },

    /// Hashing or signing the request failed
    #[error("Signing error: {stage}: {message}")]
    Signing { stage: &'static str, message: String },

    /// The network exchange failed
    #[error("Transport error: {context}: {message}")]
    Transport { context: &'static str, message: String },

    /// The response could not be hex decoded or deserialized
    #[error("Format error: {context}: {message}")]
    Format { context: &'static str, message: String },

    /// Decoding succeeded but produced nothing where a payload was required
    #[error("Empty result: {what}")]
    EmptyResult { what: &'static str },

    /// Invalid signature supplied for verification
    #[error("Invalid signature: {message}")]
    InvalidSignature { message: String },

    /// Invalid handle
    #[error("Invalid handle: {handle}")]
    InvalidHandle { handle: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl BsvaliasError {
    /// Create a not capable error
    pub fn not_capable(capability: impl Into<String>) -> Self {
        Self::NotCapable {
            capability: capability.into(),
        }
    }

    /// Create a signing error for the given stage
    pub fn signing(stage: &'static str, message: impl std::fmt::Display) -> Self {
        Self::Signing {
            stage,
            message: message.to_string(),
        }
    }

    /// Create a transport error with call-site context
    pub fn transport(context: &'static str, message: impl std::fmt::Display) -> Self {
        Self::Transport {
            context,
            message: message.to_string(),
        }
    }

    /// Create a format error with call-site context
    pub fn format(context: &'static str, message: impl std::fmt::Display) -> Self {
        Self::Format {
            context,
            message: message.to_string(),
        }
    }

    /// Create an empty result error
    pub fn empty_result(what: &'static str) -> Self {
        Self::EmptyResult { what }
    }

    /// Create an invalid signature error
    pub fn invalid_signature(message: impl Into<String>) -> Self {
        Self::InvalidSignature {
            message: message.into(),
        }
    }

    /// Create an invalid handle error
    pub fn invalid_handle(handle: impl Into<String>) -> Self {
        Self::InvalidHandle {
            handle: handle.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Name of the stage that failed, if the error carries one
    pub fn stage(&self) -> Option<&'static str> {
        match self {
            Self::Signing { stage, .. } => Some(*stage),
            Self::Transport { context, .. } | Self::Format { context, .. } => Some(*context),
            _ => None,
        }
    }
}
