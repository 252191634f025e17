//! Domain models for the migration.
//!
//! This module contains the parsed note model and the typed settings the
//! tool runs with.

/// Parsed note model.
pub mod note;
pub use note::{NoteKind, ParsedNote};

/// Typed settings loaded from `settings.yml`.
pub mod settings;
pub use settings::{CrawlerSettings, LoggerSettings, Settings, SettingsError, WriterSettings};
