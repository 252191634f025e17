//! Reading Yojimbo HTML exports
//!
//! Yojimbo writes each item as an HTML page. The title sits in the first
//! `h2` of the `#values` block. Where the body lives depends on the class of
//! the `<body>` element: plain notes keep it in `#note_body`, web archives
//! only carry the link to the saved page.

use std::{
    io,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use scraper::{ElementRef, Html, Selector};

use crate::domain::{NoteKind, ParsedNote};

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("#values h2"));
static BODY: LazyLock<Selector> = LazyLock::new(|| selector("body"));
static NOTE_BODY: LazyLock<Selector> = LazyLock::new(|| selector("#note_body"));
static ARCHIVE_LINK: LazyLock<Selector> = LazyLock::new(|| selector(".value a"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

/// A Yojimbo export that could not be read.
#[derive(Debug, thiserror::Error)]
#[error("could not open {}", path.display())]
pub struct UnreadableNote {
    /// The file that was tried.
    pub path: PathBuf,
    /// The underlying I/O error.
    #[source]
    pub source: io::Error,
}

/// Reads a Yojimbo export in full.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected, so only
/// a failure to access the file is an error.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn read_note(path: &Path) -> Result<String, UnreadableNote> {
    let bytes = std::fs::read(path).map_err(|source| UnreadableNote {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("Opened {}", path.display());

    Ok(match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

/// Extracts the title, body and kind from the markup of a Yojimbo export.
///
/// Parsing never fails. Missing elements leave the corresponding field empty
/// and are logged as warnings against `origin`, the file the markup came
/// from.
#[must_use]
pub fn parse_note(markup: &str, origin: &Path) -> ParsedNote {
    let document = Html::parse_document(markup);

    let title = first_text(&document, &TITLE);
    if title.is_none() {
        tracing::warn!("No title for {}", origin.display());
    }

    let kind = document
        .select(&BODY)
        .next()
        .map_or(NoteKind::Unknown, |body| {
            let classes: Vec<&str> = body.value().classes().collect();
            NoteKind::from_classes(&classes)
        });

    let body = match kind {
        NoteKind::Note => {
            tracing::debug!("Found a note item in {}", origin.display());
            first_text(&document, &NOTE_BODY)
        }
        NoteKind::WebArchive => {
            tracing::debug!("Found a web archive in {}", origin.display());
            first_text(&document, &ARCHIVE_LINK)
        }
        NoteKind::Unknown => {
            tracing::info!("Unknown note type in {}", origin.display());
            return ParsedNote {
                title,
                body: None,
                kind,
            };
        }
    };

    if body.is_none() {
        tracing::warn!("No body for {}", origin.display());
    }

    ParsedNote { title, body, kind }
}

/// The concatenated descendant text of the first element matching `selector`.
fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document.select(selector).next().map(text_content)
}

fn text_content(element: ElementRef<'_>) -> String {
    element.text().collect()
}
