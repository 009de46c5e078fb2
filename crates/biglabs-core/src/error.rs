//! Error types for the Biglabs services.

use serde::Serialize;
use thiserror::Error;

/// A shared error type for the entire Biglabs workspace.
///
/// This provides typed, structured error variants. File system errors convert
/// automatically via `From`.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BiglabsError {
    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Authentication error (bad credentials, missing session, rejected token)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Remote service error (HTTP failure from Supabase or Anthropic)
    #[error("Remote service error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Remote {
        status: Option<u16>,
        message: String,
    },

    /// Input rejected before reaching any service
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BiglabsError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Creates a Remote error
    pub fn remote(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is an authentication error
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a remote service error
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    /// Returns the user-facing message without the variant prefix.
    ///
    /// Account forms display this text directly.
    pub fn message(&self) -> String {
        match self {
            Self::Auth(message)
            | Self::Validation(message)
            | Self::Config(message)
            | Self::Internal(message) => message.clone(),
            Self::Remote { message, .. } | Self::Io { message } => message.clone(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for BiglabsError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

/// A type alias for `Result<T, BiglabsError>`.
pub type Result<T> = std::result::Result<T, BiglabsError>;
