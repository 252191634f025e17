//! A log file that rolls over by size.
//!
//! When the next write would take the file past its size limit, `log.txt`
//! is renamed to `log.txt.1`, `log.txt.1` to `log.txt.2` and so on, keeping
//! at most `backup_count` old files, and a fresh `log.txt` is started.

use std::{
    ffi::OsString,
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

/// An append-only log file with size-based rollover.
///
/// Wrap it in a [`std::sync::Mutex`] to use it as a `tracing-subscriber`
/// writer.
#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    backup_count: usize,
    file: File,
    len: u64,
}

impl RotatingFile {
    /// Opens `path` for appending, creating it and its parent directories if
    /// needed.
    ///
    /// Rollover is disabled when either `max_bytes` or `backup_count` is
    /// zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parent directories cannot be
    /// created.
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64, backup_count: usize) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = open_append(&path)?;
        let len = file.metadata()?.len();

        Ok(Self {
            path,
            max_bytes,
            backup_count,
            file,
            len,
        })
    }

    /// The path of the live log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    const fn rotates(&self) -> bool {
        self.max_bytes > 0 && self.backup_count > 0
    }

    fn should_roll_over(&self, incoming: usize) -> bool {
        self.rotates() && self.len > 0 && self.len + incoming as u64 > self.max_bytes
    }

    fn roll_over(&mut self) -> io::Result<()> {
        self.file.flush()?;

        let oldest = backup_path(&self.path, self.backup_count);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for index in (1..self.backup_count).rev() {
            let from = backup_path(&self.path, index);
            if from.exists() {
                fs::rename(&from, backup_path(&self.path, index + 1))?;
            }
        }
        fs::rename(&self.path, backup_path(&self.path, 1))?;

        self.file = open_append(&self.path)?;
        self.len = 0;
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.should_roll_over(buf.len()) {
            self.roll_over()?;
        }
        let written = self.file.write(buf)?;
        self.len += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// `log.txt` -> `log.txt.<index>`
fn backup_path(path: &Path, index: usize) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(format!(".{index}"));
    PathBuf::from(name)
}
