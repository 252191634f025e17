pub mod crawler;
pub mod tomboy;
pub mod yojimbo;

pub use crawler::{CrawlError, Crawler, RunSummary};
pub use tomboy::{ExportDirError, NoteWriter, WriteError, ensure_export_dir};
pub use yojimbo::{UnreadableNote, parse_note, read_note};
