//! IMAP client for connecting to the mailbox.

use async_imap::Session;
use async_native_tls::TlsConnector;
use futures_util::StreamExt;
use log::{debug, info, warn};
use secrecy::ExposeSecret;

use crate::config::MailboxConfig;

use super::error::{EmailError, Result};

/// Type alias for the underlying async stream (async-std compatible TcpStream).
type AsyncTcpStream = async_io::Async<std::net::TcpStream>;

/// Type alias for the TLS stream used by the IMAP session.
type TlsStream = async_native_tls::TlsStream<AsyncTcpStream>;

/// IMAP client for fetching messages. Always connects over implicit TLS;
/// plaintext IMAP is not supported.
pub struct ImapClient {
    session: Option<Session<TlsStream>>,
}

impl ImapClient {
    /// Connects to the IMAP server and logs in with the configured address
    /// and secret. Authentication failures and network failures are reported
    /// separately and neither is retried.
    pub async fn connect(config: &MailboxConfig) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port);
        info!("Connecting to IMAP server at {}", addr);

        // Establish TCP connection using std::net and wrap with async-io
        let std_stream = std::net::TcpStream::connect(&addr)
            .map_err(|e| EmailError::ConnectionFailed(e.to_string()))?;
        std_stream
            .set_nonblocking(true)
            .map_err(|e| EmailError::ConnectionFailed(e.to_string()))?;
        let tcp_stream = async_io::Async::new(std_stream)
            .map_err(|e| EmailError::ConnectionFailed(e.to_string()))?;

        // Wrap with TLS
        let tls = TlsConnector::new();
        let tls_stream = tls
            .connect(&config.host, tcp_stream)
            .await
            .map_err(|e| EmailError::TlsError(e.to_string()))?;

        let client = async_imap::Client::new(tls_stream);

        let session = client
            .login(&config.address, config.secret.expose_secret())
            .await
            .map_err(|(e, _)| EmailError::AuthenticationFailed(e.to_string()))?;

        info!("Authenticated to IMAP server as {}", config.address);
        Ok(Self {
            session: Some(session),
        })
    }

    /// Selects a folder for reading. Fetching message bodies from a selected
    /// folder marks them as seen.
    pub async fn select_folder(&mut self, folder: &str) -> Result<()> {
        let session = self.session_mut()?;

        info!("Selecting folder: {}", folder);
        session.select(folder).await.map_err(|e| {
            if e.to_string().contains("Mailbox doesn't exist") || e.to_string().contains("NO") {
                EmailError::FolderNotFound(folder.to_string())
            } else {
                EmailError::ProtocolError(e.to_string())
            }
        })?;

        Ok(())
    }

    /// Searches the selected folder for unread messages.
    /// Returns the matching UIDs in ascending order.
    pub async fn search_unseen(&mut self) -> Result<Vec<u32>> {
        let session = self.session_mut()?;

        let uids = session
            .uid_search("UNSEEN")
            .await
            .map_err(|e| EmailError::ProtocolError(e.to_string()))?;

        let mut uid_list: Vec<u32> = uids.into_iter().collect();
        uid_list.sort_unstable();
        debug!("Found {} unseen messages", uid_list.len());
        Ok(uid_list)
    }

    /// Fetches a full message body by UID.
    pub async fn fetch_message(&mut self, uid: u32) -> Result<Vec<u8>> {
        let session = self.session_mut()?;

        debug!("Fetching message with UID {}", uid);

        let mut messages = session
            .uid_fetch(uid.to_string(), "BODY[]")
            .await
            .map_err(|e| EmailError::ProtocolError(e.to_string()))?;

        let message = messages
            .next()
            .await
            .ok_or_else(|| {
                EmailError::ProtocolError(format!("Message with UID {} not found", uid))
            })?
            .map_err(|e| EmailError::ProtocolError(e.to_string()))?;

        let body = message
            .body()
            .ok_or_else(|| EmailError::ProtocolError("Message has no body".to_string()))?;

        Ok(body.to_vec())
    }

    /// Logs out and drops the session.
    pub async fn logout(&mut self) -> Result<()> {
        if let Some(mut session) = self.session.take() {
            info!("Disconnecting from IMAP server");
            session
                .logout()
                .await
                .map_err(|e| EmailError::ProtocolError(e.to_string()))?;
        }
        Ok(())
    }

    /// Checks if the client still holds a live session.
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    fn session_mut(&mut self) -> Result<&mut Session<TlsStream>> {
        self.session
            .as_mut()
            .ok_or_else(|| EmailError::ConnectionFailed("Not connected".to_string()))
    }
}

impl Drop for ImapClient {
    fn drop(&mut self) {
        if self.session.is_some() {
            warn!("ImapClient dropped without explicit logout - session will be closed");
        }
    }
}
