//! Walking a Yojimbo export
//!
//! The [`Crawler`] visits every file under the source directory, converts
//! each Yojimbo export it finds and writes the result into the export
//! directory. Everything that goes wrong with a single file is logged and
//! contained to that file.

use std::{
    collections::HashMap,
    ffi::{OsStr, OsString},
    fmt,
    path::{Path, PathBuf},
};

use walkdir::WalkDir;

use crate::{
    domain::ParsedNote,
    storage::{
        tomboy::NoteWriter,
        yojimbo::{parse_note, read_note},
    },
};

/// Extension of the files Yojimbo exports.
const SOURCE_EXTENSION: &[u8] = b".html";

/// Extension Tomboy expects on note files.
const NOTE_EXTENSION: &str = "note";

/// Counts accumulated over one crawl.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Files that looked like Yojimbo exports and were converted.
    pub accepted: usize,
    /// Files that were ignored.
    pub skipped: usize,
    /// Accepted files whose note could not be written.
    pub failed: usize,
}

impl RunSummary {
    /// Number of files visited.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.accepted + self.skipped
    }

    /// Number of notes written.
    #[must_use]
    pub const fn written(&self) -> usize {
        self.accepted - self.failed
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} processed, {} skipped",
            self.accepted, self.skipped
        )?;
        if self.failed > 0 {
            write!(f, ", {} failed", self.failed)?;
        }
        Ok(())
    }
}

/// A failure that stops the crawl before it starts.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    /// The source directory does not exist.
    #[error("can't find source directory: {}", .0.display())]
    MissingSourceDirectory(PathBuf),
}

/// Converts every Yojimbo export under a directory tree.
#[derive(Debug)]
pub struct Crawler<'a> {
    source_dir: PathBuf,
    export_dir: PathBuf,
    writer: &'a NoteWriter,
}

impl<'a> Crawler<'a> {
    /// Creates a crawler reading from `source_dir` and writing notes into
    /// `export_dir`.
    ///
    /// The export directory must already exist when [`Crawler::crawl`] runs.
    #[must_use]
    pub const fn new(source_dir: PathBuf, export_dir: PathBuf, writer: &'a NoteWriter) -> Self {
        Self {
            source_dir,
            export_dir,
            writer,
        }
    }

    /// Walks the source directory and converts every Yojimbo export in it.
    ///
    /// Files are visited one at a time, in file name order within each
    /// directory. A file is converted when its name ends in `.html` and does
    /// not start with a dot; everything else is skipped. Output is flat:
    /// `Notes/a.html` becomes `a.note` in the export directory.
    ///
    /// # Errors
    ///
    /// Returns an error, without reading or writing anything, if the source
    /// directory does not exist. Failures with individual files are logged
    /// and counted but never returned.
    pub fn crawl(&self) -> Result<RunSummary, CrawlError> {
        if !self.source_dir.is_dir() {
            let error = CrawlError::MissingSourceDirectory(self.source_dir.clone());
            tracing::error!("{error}");
            return Err(error);
        }

        let mut summary = RunSummary::default();
        // Output name -> the source file that produced it.
        let mut produced: HashMap<OsString, PathBuf> = HashMap::new();

        let entries = WalkDir::new(&self.source_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Failed to walk {}: {e}", self.source_dir.display());
                    None
                }
            })
            // Symlinks are not followed by the walk. Links to files, and
            // dangling links, are listed alongside regular files.
            .filter(|entry| !entry.path().is_dir());

        for entry in entries {
            let path = entry.path();
            let name = entry.file_name();
            if !is_candidate(name) {
                summary.skipped += 1;
                tracing::warn!("File skipped: {}", name.to_string_lossy());
                continue;
            }

            summary.accepted += 1;
            tracing::debug!("Parsing {}", name.to_string_lossy());

            let note_name = note_file_name(name);
            if let Some(previous) = produced.insert(note_name.clone(), path.to_path_buf()) {
                tracing::warn!(
                    "{} overwrites {} exported from {}",
                    path.display(),
                    note_name.to_string_lossy(),
                    previous.display()
                );
            }

            if !self.convert(path, &note_name) {
                summary.failed += 1;
            }
        }

        tracing::info!("Files processed: {}", summary.accepted);
        tracing::info!("Files skipped: {}", summary.skipped);
        if summary.failed > 0 {
            tracing::warn!("Notes not written: {}", summary.failed);
        }

        Ok(summary)
    }

    /// Reads, parses and writes one export. Returns `false` if the note
    /// could not be written.
    fn convert(&self, path: &Path, note_name: &OsStr) -> bool {
        let note = match read_note(path) {
            Ok(markup) => parse_note(&markup, path),
            Err(e) => {
                tracing::error!("{e}: {}", e.source);
                ParsedNote::empty()
            }
        };

        match self.writer.write_note(&note, &self.export_dir, note_name) {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("{e}");
                false
            }
        }
    }
}

/// Whether a file name looks like a Yojimbo export.
///
/// Compared byte-wise, so names that are not valid UTF-8 still qualify.
fn is_candidate(name: &OsStr) -> bool {
    let bytes = name.as_encoded_bytes();
    bytes.ends_with(SOURCE_EXTENSION) && !bytes.starts_with(b".")
}

/// Swaps the final extension of `name` for `.note`.
fn note_file_name(name: &OsStr) -> OsString {
    Path::new(name)
        .with_extension(NOTE_EXTENSION)
        .into_os_string()
}
