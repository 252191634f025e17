//! Writing Tomboy notes
//!
//! Tomboy keeps one XML file per note. [`NoteWriter`] renders the bundled
//! note and notebook-template documents and writes them into the export
//! directory.

use std::{
    fmt::Write as _,
    io,
    path::{Path, PathBuf},
};

use chrono::Utc;
use minijinja::{Environment, ErrorKind, Output, Value, context};

use crate::domain::ParsedNote;

/// Name of the per-note template.
pub const NOTE_TEMPLATE: &str = "tomboy-note.xml";

/// Name of the notebook template.
pub const NOTEBOOK_TEMPLATE: &str = "tomboy-notebook.xml";

/// File the notebook template is written to inside the export directory.
pub const NOTEBOOK_FILE_NAME: &str = "tomboy-notebook-template.note";

/// Tomboy's date format: ISO 8601 with microseconds and no offset.
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// The current UTC time in Tomboy's date format.
#[must_use]
pub fn timestamp() -> String {
    Utc::now().format(DATE_FORMAT).to_string()
}

/// Renders and writes Tomboy notes.
#[derive(Debug)]
pub struct NoteWriter {
    templates: Environment<'static>,
}

impl Default for NoteWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteWriter {
    /// Creates a writer with the bundled templates loaded.
    ///
    /// # Panics
    ///
    /// Panics if a bundled template fails to compile.
    #[must_use]
    pub fn new() -> Self {
        let mut templates = Environment::new();
        // Note text is XML character data.
        templates.set_formatter(|out, _state, value| write_xml_text(out, value));
        templates
            .add_template(NOTE_TEMPLATE, include_str!("../../templates/tomboy-note.xml"))
            .expect("bundled note template must compile");
        templates
            .add_template(
                NOTEBOOK_TEMPLATE,
                include_str!("../../templates/tomboy-notebook.xml"),
            )
            .expect("bundled notebook template must compile");
        Self { templates }
    }

    /// Renders a note with all three of its dates set to `timestamp`.
    ///
    /// A missing title or body renders as empty text.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render_note(
        &self,
        note: &ParsedNote,
        timestamp: &str,
    ) -> Result<String, minijinja::Error> {
        self.templates.get_template(NOTE_TEMPLATE)?.render(context! {
            title => note.title_text(),
            body => note.body_text(),
            create_date => timestamp,
            last_change_date => timestamp,
            last_metadata_change_date => timestamp,
        })
    }

    /// Renders the notebook template with all three of its dates set to
    /// `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render_notebook_template(&self, timestamp: &str) -> Result<String, minijinja::Error> {
        self.templates
            .get_template(NOTEBOOK_TEMPLATE)?
            .render(context! {
                create_date => timestamp,
                last_change_date => timestamp,
                last_metadata_change_date => timestamp,
            })
    }

    /// Writes `note` to `export_dir/filename`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the note cannot be rendered or the file cannot be
    /// written.
    pub fn write_note(
        &self,
        note: &ParsedNote,
        export_dir: &Path,
        filename: impl AsRef<Path>,
    ) -> Result<PathBuf, WriteError> {
        let path = export_dir.join(filename);
        tracing::debug!("Creating note at {}", path.display());

        let rendered = self
            .render_note(note, &timestamp())
            .map_err(|source| WriteError::Render {
                path: path.clone(),
                source,
            })?;
        write_file(path, &rendered)
    }

    /// Writes the notebook template into `export_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the template cannot be rendered or the file cannot
    /// be written.
    pub fn write_notebook_template(&self, export_dir: &Path) -> Result<PathBuf, WriteError> {
        let path = export_dir.join(NOTEBOOK_FILE_NAME);
        tracing::debug!("Creating notebook template at {}", path.display());

        let rendered =
            self.render_notebook_template(&timestamp())
                .map_err(|source| WriteError::Render {
                    path: path.clone(),
                    source,
                })?;
        write_file(path, &rendered)
    }
}

/// Writes `value` as XML character data.
///
/// Only `&`, `<`, `>` and `"` are replaced. Slashes and apostrophes are kept
/// as they are, so URLs and names read the same in Tomboy.
fn write_xml_text(out: &mut Output<'_>, value: &Value) -> Result<(), minijinja::Error> {
    if value.is_undefined() || value.is_none() {
        return Ok(());
    }

    let text = value.to_string();
    let mut rest = text.as_str();
    while let Some(at) = rest.find(['&', '<', '>', '"']) {
        let entity = match rest.as_bytes()[at] {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            _ => "&quot;",
        };
        write!(out, "{}{entity}", &rest[..at]).map_err(|_| ErrorKind::WriteFailure)?;
        rest = &rest[at + 1..];
    }
    write!(out, "{rest}").map_err(|_| ErrorKind::WriteFailure.into())
}

fn write_file(path: PathBuf, content: &str) -> Result<PathBuf, WriteError> {
    match std::fs::write(&path, content) {
        Ok(()) => Ok(path),
        Err(source) => Err(WriteError::Io { path, source }),
    }
}

/// A failure writing a Tomboy note.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// The template failed to render.
    #[error("failed to render {}: {source}", path.display())]
    Render {
        /// The file that was being produced.
        path: PathBuf,
        /// The template error.
        source: minijinja::Error,
    },

    /// The rendered note could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        /// The file that was being written.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
}

/// A failure preparing the export directory.
#[derive(Debug, thiserror::Error)]
pub enum ExportDirError {
    /// No export directory was given.
    #[error("the export directory path is empty")]
    EmptyPath,

    /// The directory could not be created.
    #[error("there was a problem creating the directory {}: {source}", path.display())]
    Create {
        /// The directory that was being created.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
}

/// Makes sure the export directory exists, creating it and any missing
/// parents.
///
/// # Errors
///
/// Returns an error if `path` is empty or the directory cannot be created.
pub fn ensure_export_dir(path: &Path) -> Result<(), ExportDirError> {
    if path.as_os_str().is_empty() {
        return Err(ExportDirError::EmptyPath);
    }

    if path.is_dir() {
        tracing::info!("The directory {} already exists", path.display());
        return Ok(());
    }

    std::fs::create_dir_all(path).map_err(|source| ExportDirError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("Created export directory {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;
    use tempfile::TempDir;

    use super::*;
    use crate::domain::NoteKind;

    const FIXED: &str = "2024-03-01T09:30:15.123456";

    fn note(title: Option<&str>, body: Option<&str>) -> ParsedNote {
        ParsedNote {
            title: title.map(str::to_string),
            body: body.map(str::to_string),
            kind: NoteKind::Note,
        }
    }

    /// Text between the first `<tag>` and the following `</tag>`.
    fn element<'a>(xml: &'a str, tag: &str) -> &'a str {
        let open = format!("<{tag}>");
        let close = format!("</{tag}>");
        let start = xml.find(&open).expect("opening tag") + open.len();
        let end = start + xml[start..].find(&close).expect("closing tag");
        &xml[start..end]
    }

    #[test]
    fn timestamp_is_iso_8601_without_offset() {
        let now = timestamp();

        assert!(NaiveDateTime::parse_from_str(&now, DATE_FORMAT).is_ok());
        assert!(!now.ends_with('Z'));
        assert!(!now.contains('+'));
        assert_eq!(now.rsplit('.').next().map(str::len), Some(6));
    }

    #[test]
    fn renders_title_and_body_verbatim() {
        let writer = NoteWriter::new();

        let xml = writer
            .render_note(&note(Some("My Title"), Some("Hello world")), FIXED)
            .unwrap();

        assert_eq!(element(&xml, "title"), "My Title");
        assert!(xml.contains(
            "<note-content version=\"0.1\">My Title\n\nHello world</note-content>"
        ));
    }

    #[test]
    fn all_dates_match() {
        let writer = NoteWriter::new();

        let xml = writer.render_note(&note(None, None), FIXED).unwrap();

        assert_eq!(element(&xml, "create-date"), FIXED);
        assert_eq!(element(&xml, "last-change-date"), FIXED);
        assert_eq!(element(&xml, "last-metadata-change-date"), FIXED);
    }

    #[test]
    fn missing_fields_render_empty() {
        let writer = NoteWriter::new();

        let xml = writer.render_note(&note(None, None), FIXED).unwrap();

        assert_eq!(element(&xml, "title"), "");
        assert!(xml.contains("<note-content version=\"0.1\">\n\n</note-content>"));
        assert!(!xml.contains("none"));
    }

    #[test]
    fn note_text_is_escaped() {
        let writer = NoteWriter::new();

        let xml = writer
            .render_note(&note(Some("Tom & Jerry"), Some("1 < 2")), FIXED)
            .unwrap();

        assert_eq!(element(&xml, "title"), "Tom &amp; Jerry");
        assert!(xml.contains("1 &lt; 2"));
    }

    #[test]
    fn urls_and_apostrophes_are_kept_as_written() {
        let writer = NoteWriter::new();

        let xml = writer
            .render_note(
                &note(
                    Some("O'Brien's links"),
                    Some("https://example.com/a/b?x=1&y=2 says \"hi\" > bye"),
                ),
                FIXED,
            )
            .unwrap();

        assert_eq!(element(&xml, "title"), "O'Brien's links");
        assert!(xml.contains(
            "https://example.com/a/b?x=1&amp;y=2 says &quot;hi&quot; &gt; bye</note-content>"
        ));
        assert!(!xml.contains("&#x2f;"));
        assert!(!xml.contains("&#x27;"));
    }

    #[test]
    fn notebook_template_is_tagged_as_template() {
        let writer = NoteWriter::new();

        let xml = writer.render_notebook_template(FIXED).unwrap();

        assert!(xml.contains("<tag>system:template</tag>"));
        assert!(xml.contains("<tag>system:notebook:Yojimbo</tag>"));
        assert_eq!(element(&xml, "create-date"), FIXED);
        assert_eq!(element(&xml, "last-change-date"), FIXED);
    }

    #[test]
    fn write_note_overwrites_existing_file() {
        let tmp = TempDir::new().unwrap();
        let writer = NoteWriter::new();
        std::fs::write(tmp.path().join("a.note"), "stale").unwrap();

        let path = writer
            .write_note(&note(Some("Fresh"), None), tmp.path(), "a.note")
            .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(path, tmp.path().join("a.note"));
        assert_eq!(element(&written, "title"), "Fresh");

        let created = element(&written, "create-date");
        assert_eq!(created, element(&written, "last-change-date"));
        assert_eq!(created, element(&written, "last-metadata-change-date"));
        assert!(NaiveDateTime::parse_from_str(created, DATE_FORMAT).is_ok());
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let tmp = TempDir::new().unwrap();
        let writer = NoteWriter::new();
        let missing = tmp.path().join("nowhere");

        let error = writer
            .write_note(&note(None, None), &missing, "a.note")
            .unwrap_err();

        assert!(matches!(error, WriteError::Io { .. }));
    }

    #[test]
    fn writes_notebook_template_file() {
        let tmp = TempDir::new().unwrap();
        let writer = NoteWriter::new();

        let path = writer.write_notebook_template(tmp.path()).unwrap();

        assert_eq!(path, tmp.path().join(NOTEBOOK_FILE_NAME));
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(element(&written, "title"), "Yojimbo Notebook Template");
    }

    #[test]
    fn ensure_export_dir_creates_nested_directories() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("tomboy").join("notes");

        ensure_export_dir(&nested).unwrap();
        assert!(nested.is_dir());

        // Already present is fine.
        ensure_export_dir(&nested).unwrap();
    }

    #[test]
    fn ensure_export_dir_rejects_empty_path() {
        let error = ensure_export_dir(Path::new("")).unwrap_err();
        assert!(matches!(error, ExportDirError::EmptyPath));
    }

    #[test]
    fn ensure_export_dir_fails_over_a_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("occupied");
        std::fs::write(&file, "").unwrap();

        let error = ensure_export_dir(&file).unwrap_err();
        assert!(matches!(error, ExportDirError::Create { .. }));
    }
}
