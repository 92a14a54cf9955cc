//! Error taxonomy for the chat client.
//!
//! None of these are fatal: the controller turns each one into a chat
//! message and returns to idle.

use std::path::PathBuf;

/// Failure of a backend call, classified by what reached the server.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// No response reached us (connection refused, DNS, timeout).
    #[error("backend unreachable: {0}")]
    Network(String),
    #[error("backend server error (status {0})")]
    Server(u16),
    #[error("endpoint not found: {0}")]
    NotFound(String),
    /// Any other failure; carries the server's message payload when one was sent.
    #[error("request failed (status {status:?}): {}", message.as_deref().unwrap_or("no message"))]
    Other {
        status: Option<u16>,
        message: Option<String>,
    },
}

/// User text contained characters outside the supported script.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported character {offending:?} in input")]
pub struct ValidationError {
    pub offending: char,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoiceError {
    #[error("speech recognition is not available on this platform")]
    CapabilityUnavailable,
    #[error("speech recognition failed: {0}")]
    Recognition(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PreferenceError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("preference file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed preference file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed config file: {0}")]
    Parse(#[from] serde_json::Error),
}
