//! Mailbox collection error types.

use thiserror::Error;

/// Errors that can occur while collecting attachments from the mailbox.
#[derive(Error, Debug)]
pub enum EmailError {
    /// Failed to connect to the IMAP server.
    #[error("IMAP connection failed: {0}")]
    ConnectionFailed(String),

    /// TLS/SSL error during connection.
    #[error("TLS error: {0}")]
    TlsError(String),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// IMAP protocol error.
    #[error("IMAP protocol error: {0}")]
    ProtocolError(String),

    /// Failed to parse a message.
    #[error("Failed to parse message: {0}")]
    ParseError(String),

    /// IMAP folder not found.
    #[error("IMAP folder '{0}' not found")]
    FolderNotFound(String),
}

impl From<async_native_tls::Error> for EmailError {
    fn from(err: async_native_tls::Error) -> Self {
        EmailError::TlsError(err.to_string())
    }
}

/// Result type for mailbox operations.
pub type Result<T> = std::result::Result<T, EmailError>;
