//! Startup error types
//!
//! Everything that can stop the server before (or while) it is listening.
//! Per-request failures never surface here; they become HTTP error responses.

use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Directory '{}' does not exist.", .0.display())]
    InvalidDirectory(PathBuf),

    #[error("Invalid address '{0}'")]
    InvalidAddress(String),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_directory_message() {
        let err = ServerError::InvalidDirectory(PathBuf::from("/no/such/dir"));
        assert_eq!(err.to_string(), "Directory '/no/such/dir' does not exist.");
    }

    #[test]
    fn test_bind_message_includes_address() {
        let err = ServerError::Bind {
            addr: "0.0.0.0:8080".parse().unwrap(),
            source: std::io::Error::from(std::io::ErrorKind::AddrInUse),
        };
        assert!(err.to_string().starts_with("Failed to bind 0.0.0.0:8080"));
    }
}
