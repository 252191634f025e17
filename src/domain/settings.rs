use std::{
    fmt, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;

/// Settings for a migration run.
///
/// Loaded from a YAML file with `logger`, `crawler` and `writer` sections.
/// Every key is required; missing keys are reported together by
/// [`SettingsError::MissingKeys`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Log file location and rotation.
    pub logger: LoggerSettings,
    /// Where to find the Yojimbo export.
    pub crawler: CrawlerSettings,
    /// Where to write the Tomboy notes.
    pub writer: WriterSettings,
}

/// Log file location and rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerSettings {
    /// Path of the log file.
    ///
    /// A relative path is resolved against the directory holding the
    /// settings file.
    pub log_filename: PathBuf,
    /// Size at which the log file is rolled over. Zero disables rollover.
    pub log_max_bytes: u64,
    /// Number of rolled-over files to keep. Zero disables rollover.
    pub log_backup_count: usize,
}

/// Where to find the Yojimbo export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlerSettings {
    /// Root of the exported HTML tree.
    pub root_dir: PathBuf,
}

/// Where to write the Tomboy notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterSettings {
    /// Directory receiving the `.note` files.
    pub export_dir: PathBuf,
}

impl Settings {
    /// Loads the settings from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid YAML, or is
    /// missing any required key.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings = Self::from_yaml(&content)?;

        if settings.logger.log_filename.is_relative() {
            if let Some(base) = path.parent() {
                settings.logger.log_filename = base.join(&settings.logger.log_filename);
            }
        }

        Ok(settings)
    }

    /// Parses settings from YAML text.
    ///
    /// Paths are taken as written.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid YAML or is missing any
    /// required key.
    pub fn from_yaml(content: &str) -> Result<Self, SettingsError> {
        // An empty document deserialises as null rather than an empty map.
        let raw: Option<RawSettings> = serde_yaml::from_str(content)?;
        raw.unwrap_or_default().validate()
    }
}

/// The settings file as written, before required keys are checked.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSettings {
    logger: RawLogger,
    crawler: RawCrawler,
    writer: RawWriter,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawLogger {
    log_filename: Option<PathBuf>,
    log_max_bytes: Option<u64>,
    log_backup_count: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCrawler {
    root_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawWriter {
    export_dir: Option<PathBuf>,
}

impl RawSettings {
    fn validate(self) -> Result<Settings, SettingsError> {
        let mut missing = Vec::new();

        let log_filename = require(
            non_empty(self.logger.log_filename),
            "logger.log_filename",
            &mut missing,
        );
        let log_max_bytes = require(self.logger.log_max_bytes, "logger.log_max_bytes", &mut missing);
        let log_backup_count = require(
            self.logger.log_backup_count,
            "logger.log_backup_count",
            &mut missing,
        );
        let root_dir = require(
            non_empty(self.crawler.root_dir),
            "crawler.root_dir",
            &mut missing,
        );
        let export_dir = require(
            non_empty(self.writer.export_dir),
            "writer.export_dir",
            &mut missing,
        );

        match (
            log_filename,
            log_max_bytes,
            log_backup_count,
            root_dir,
            export_dir,
        ) {
            (
                Some(log_filename),
                Some(log_max_bytes),
                Some(log_backup_count),
                Some(root_dir),
                Some(export_dir),
            ) => Ok(Settings {
                logger: LoggerSettings {
                    log_filename,
                    log_max_bytes,
                    log_backup_count,
                },
                crawler: CrawlerSettings { root_dir },
                writer: WriterSettings { export_dir },
            }),
            _ => Err(SettingsError::MissingKeys(missing)),
        }
    }
}

/// An empty path counts as missing.
fn non_empty(path: Option<PathBuf>) -> Option<PathBuf> {
    path.filter(|path| !path.as_os_str().is_empty())
}

fn require<T>(value: Option<T>, key: &'static str, missing: &mut Vec<&'static str>) -> Option<T> {
    if value.is_none() {
        missing.push(key);
    }
    value
}

/// An error loading [`Settings`].
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("could not open settings file {}: {source}", path.display())]
    Read {
        /// The path that was tried.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The settings file is not valid YAML, or a value has the wrong type.
    #[error("failed to parse settings file: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// One or more required keys are missing, named by their dotted path.
    #[error("{}", MissingKeysDisplay(.0))]
    MissingKeys(Vec<&'static str>),
}

struct MissingKeysDisplay<'a>(&'a [&'static str]);

impl fmt::Display for MissingKeysDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing settings: ")?;
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}
