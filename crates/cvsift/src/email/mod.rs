//! Mailbox attachment collection over IMAP.
//!
//! The collector scans unread messages, picks out attachments whose filename
//! extension is in the resume allow-list, and persists each one to the flat
//! resume folder under a collision-free name.

pub mod client;
pub mod collector;
pub mod error;
pub mod parser;

pub use client::ImapClient;
pub use collector::AttachmentCollector;
pub use error::EmailError;
pub use parser::{is_resume_file, AttachmentParser, ResumeAttachment};
