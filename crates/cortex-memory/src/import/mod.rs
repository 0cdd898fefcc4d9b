//! Conversation import pipeline
//!
//! Takes raw transcript text from a file, the clipboard or a string, checks
//! it, parses it, extracts semantics and hands it to a
//! [`ConversationStore`](crate::storage::ConversationStore).

pub mod clipboard;
mod error;
mod importer;
mod report;
mod validation;

pub use clipboard::{ClipboardError, ClipboardProvider, SystemClipboard};
pub use error::{ImportError, ImportStage};
pub use importer::{ConversationImporter, FileImport, collect_transcripts};
pub use report::{ImportReport, ImportStatus, SemanticSummary};
