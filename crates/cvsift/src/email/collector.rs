//! Attachment collection: scans unread messages and persists resume files.

use log::{debug, error, info};
use tracing::info_span;

use crate::config::MailboxConfig;
use crate::storage::FileStorage;

use super::client::ImapClient;
use super::error::Result;
use super::parser::AttachmentParser;

/// Collects resume attachments from unread mailbox messages into the flat
/// resume folder.
pub struct AttachmentCollector {
    config: MailboxConfig,
    storage: FileStorage,
}

impl AttachmentCollector {
    pub fn new(config: MailboxConfig, storage: FileStorage) -> Self {
        Self { config, storage }
    }

    /// Scans unread messages and saves every resume attachment.
    /// Returns the number of files saved.
    ///
    /// Connection and authentication failures abort the run. A failure on one
    /// message (fetch, malformed MIME) skips only that message. The session
    /// is always logged out, even when the scan fails; teardown errors are
    /// swallowed.
    pub async fn collect(&self) -> Result<usize> {
        let _span = info_span!("collect", folder = %self.config.folder).entered();

        let mut client = ImapClient::connect(&self.config).await?;
        let result = self.scan_messages(&mut client).await;

        if let Err(e) = client.logout().await {
            debug!("IMAP logout failed: {}", e);
        }

        result
    }

    async fn scan_messages(&self, client: &mut ImapClient) -> Result<usize> {
        client.select_folder(&self.config.folder).await?;

        let uids = client.search_unseen().await?;
        if uids.is_empty() {
            info!("No unread messages in '{}'", self.config.folder);
            return Ok(0);
        }

        info!(
            "Found {} unread messages in '{}'",
            uids.len(),
            self.config.folder
        );

        let parser = AttachmentParser::new();
        let mut saved = 0usize;

        for uid in uids {
            let raw = match client.fetch_message(uid).await {
                Ok(raw) => raw,
                Err(e) => {
                    error!("Failed to fetch message UID {}: {}", uid, e);
                    continue;
                }
            };

            let (summary, attachments) = match parser.extract_resume_attachments(&raw) {
                Ok(parsed) => parsed,
                Err(e) => {
                    error!("Failed to parse message UID {}: {}", uid, e);
                    continue;
                }
            };

            debug!(
                "Message from {} ({}): {} resume attachment(s)",
                summary.sender,
                summary.subject,
                attachments.len()
            );

            for attachment in attachments {
                match self
                    .storage
                    .save_unique(&attachment.filename, &attachment.content)
                {
                    Ok(path) => {
                        info!("Saved {}", path.display());
                        saved += 1;
                    }
                    Err(e) => {
                        error!(
                            "Failed to save attachment '{}' from UID {}: {}",
                            attachment.filename, uid, e
                        );
                    }
                }
            }
        }

        info!("Collection complete: {} file(s) saved", saved);
        Ok(saved)
    }
}
