//! Message parsing and resume attachment extraction.

use log::debug;
use mail_parser::{Message, MessageParser, MimeHeaders, PartType};

use super::error::{EmailError, Result};

/// File extensions that plausibly carry a resume.
const RESUME_EXTENSIONS: [&str; 5] = ["pdf", "doc", "docx", "txt", "rtf"];

/// Returns true if the filename's extension is in the resume allow-list,
/// compared case-insensitively. Filenames without an extension never match.
pub fn is_resume_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
            let ext = ext.to_ascii_lowercase();
            RESUME_EXTENSIONS.contains(&ext.as_str())
        }
        _ => false,
    }
}

/// A resume attachment lifted out of one message.
#[derive(Debug)]
pub struct ResumeAttachment {
    /// The attachment's filename, MIME-word decoded.
    pub filename: String,
    /// The attachment's raw content.
    pub content: Vec<u8>,
}

/// Decoded headers of the source message, used for logging.
#[derive(Debug, Clone)]
pub struct MessageSummary {
    pub sender: String,
    pub subject: String,
}

/// Parser that lifts resume attachments out of raw messages.
///
/// Header and filename MIME-word decoding happens inside `mail-parser`, which
/// decodes lossily instead of failing, so one bad header never aborts a
/// message.
pub struct AttachmentParser;

impl AttachmentParser {
    pub fn new() -> Self {
        Self
    }

    /// Extracts resume attachments from a raw message.
    ///
    /// A part counts as a candidate only if it declares an attachment
    /// disposition AND carries a filename; candidates survive only when the
    /// filename passes [`is_resume_file`]. Everything else is skipped, never
    /// an error.
    pub fn extract_resume_attachments(
        &self,
        raw_message: &[u8],
    ) -> Result<(MessageSummary, Vec<ResumeAttachment>)> {
        let message = MessageParser::default()
            .parse(raw_message)
            .ok_or_else(|| EmailError::ParseError("Failed to parse message".to_string()))?;

        let summary = message_summary(&message);
        let mut attachments = Vec::new();

        for part in message.parts.iter() {
            if !has_attachment_disposition(part) {
                continue;
            }

            let Some(filename) = attachment_filename(part) else {
                debug!(
                    "Attachment without filename in message from {} (skipped)",
                    summary.sender
                );
                continue;
            };

            if !is_resume_file(&filename) {
                debug!("Attachment '{}' is not a resume file (skipped)", filename);
                continue;
            }

            let content = match &part.body {
                PartType::Binary(data) | PartType::InlineBinary(data) => data.to_vec(),
                PartType::Text(text) => text.as_bytes().to_vec(),
                PartType::Html(html) => html.as_bytes().to_vec(),
                _ => continue,
            };

            debug!(
                "Resume attachment found: {} ({} bytes)",
                filename,
                content.len()
            );

            attachments.push(ResumeAttachment { filename, content });
        }

        Ok((summary, attachments))
    }
}

impl Default for AttachmentParser {
    fn default() -> Self {
        Self::new()
    }
}

fn message_summary(message: &Message) -> MessageSummary {
    MessageSummary {
        sender: message
            .from()
            .and_then(|addr| addr.first().map(format_address))
            .unwrap_or_else(|| "(unknown sender)".to_string()),
        subject: message
            .subject()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "(no subject)".to_string()),
    }
}

/// Checks if a message part declares an attachment disposition.
fn has_attachment_disposition(part: &mail_parser::MessagePart) -> bool {
    part.content_disposition()
        .map(|disposition| disposition.ctype().eq_ignore_ascii_case("attachment"))
        .unwrap_or(false)
}

/// Gets the part's filename, if any.
fn attachment_filename(part: &mail_parser::MessagePart) -> Option<String> {
    part.attachment_name()
        .or_else(|| part.content_type().and_then(|ct| ct.attribute("name")))
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Formats an address for display.
/// With a display name, formats as "Name <email@example.com>".
fn format_address(addr: &mail_parser::Addr) -> String {
    if let Some(name) = addr.name() {
        format!("{} <{}>", name, addr.address().unwrap_or_default())
    } else {
        addr.address().unwrap_or_default().to_string()
    }
}
