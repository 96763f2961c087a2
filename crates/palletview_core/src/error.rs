//! Document error types

use std::fmt;
use std::io;

/// Error reading, parsing or writing a scene document
#[derive(Debug)]
pub enum DocumentError {
    /// IO error (file not found, permission denied, etc.)
    Io(io::Error),
    /// Parse error (invalid JSON or wrong document shape)
    Parse(serde_json::Error),
    /// Serialization error
    Serialize(serde_json::Error),
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::Io(e) => write!(f, "IO error: {}", e),
            DocumentError::Parse(e) => write!(f, "Parse error: {}", e),
            DocumentError::Serialize(e) => write!(f, "Serialize error: {}", e),
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DocumentError::Io(e) => Some(e),
            DocumentError::Parse(e) => Some(e),
            DocumentError::Serialize(e) => Some(e),
        }
    }
}

impl From<io::Error> for DocumentError {
    fn from(e: io::Error) -> Self {
        DocumentError::Io(e)
    }
}

impl From<serde_json::Error> for DocumentError {
    fn from(e: serde_json::Error) -> Self {
        DocumentError::Parse(e)
    }
}
