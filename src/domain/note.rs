use std::fmt;

/// The structural category of a Yojimbo export.
///
/// Yojimbo marks the category with a class on the document's `<body>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteKind {
    /// A plain note (`<body class="note">`).
    Note,
    /// A saved web page (`<body class="web_archive">`).
    WebArchive,
    /// Any other body class, or none at all.
    Unknown,
}

impl NoteKind {
    /// Classifies a note from the classes on its `<body>` element.
    ///
    /// `note` takes precedence over `web_archive` when both are present.
    #[must_use]
    pub fn from_classes(classes: &[&str]) -> Self {
        if classes.contains(&"note") {
            Self::Note
        } else if classes.contains(&"web_archive") {
            Self::WebArchive
        } else {
            Self::Unknown
        }
    }
}

impl fmt::Display for NoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Note => "note",
            Self::WebArchive => "web archive",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// The title and body extracted from a single Yojimbo export.
///
/// Either field is `None` when the element it comes from is missing. That is
/// tolerated: the note is still written, with empty content in its place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNote {
    /// Text of the first heading in the `values` block.
    pub title: Option<String>,
    /// The note text, or the link text for a web archive.
    pub body: Option<String>,
    /// Which layout the export used.
    pub kind: NoteKind,
}

impl ParsedNote {
    /// A note with neither title nor body, used when the source file could
    /// not be read.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            title: None,
            body: None,
            kind: NoteKind::Unknown,
        }
    }

    /// The title, or an empty string when absent.
    #[must_use]
    pub fn title_text(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    /// The body, or an empty string when absent.
    #[must_use]
    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }
}
