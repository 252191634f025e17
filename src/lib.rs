//! Yojimbo to Tomboy note migration
//!
//! Yojimbo exports one HTML file per item. This crate walks such an export,
//! pulls the title and body out of each file and writes them back out as
//! Tomboy XML notes.

pub mod domain;
pub use domain::{NoteKind, ParsedNote, Settings, SettingsError};

pub mod logging;

/// Reading Yojimbo exports and writing Tomboy notes.
pub mod storage;
pub use storage::{CrawlError, Crawler, NoteWriter, RunSummary};

#[cfg(test)]
mod test_support;
