use std::{path::PathBuf, sync::Mutex};

mod terminal;

use anyhow::Context;
use clap::ArgAction;
use tracing::instrument;
use yojimbo2tomboy::{
    Crawler, NoteWriter, Settings,
    domain::LoggerSettings,
    logging::RotatingFile,
    storage::ensure_export_dir,
};

/// Migrate a Yojimbo HTML export to Tomboy notes.
///
/// Source and destination directories and the log file are read from the
/// settings file.
#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity of console output (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Path to the settings file
    #[arg(short, long, default_value = "settings.yml")]
    config: PathBuf,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let settings = Settings::load(&self.config)
            .with_context(|| format!("failed to load {}", self.config.display()))?;
        Self::setup_logging(&settings.logger, self.verbose)?;

        tracing::info!("Starting");
        export(&settings)?;
        tracing::info!("Export complete");
        Ok(())
    }

    /// Info and above go to stderr; everything from debug up goes to the
    /// rotating log file.
    fn setup_logging(logger: &LoggerSettings, verbosity: u8) -> anyhow::Result<()> {
        use tracing_subscriber::{
            Layer, filter::LevelFilter, fmt::time::ChronoLocal, layer::SubscriberExt,
            util::SubscriberInitExt,
        };

        let level = match verbosity {
            0 => tracing::Level::INFO,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let console_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .with_filter(filter);

        let log_file = RotatingFile::open(
            &logger.log_filename,
            logger.log_max_bytes,
            logger.log_backup_count,
        )
        .with_context(|| {
            format!(
                "failed to open log file {}",
                logger.log_filename.display()
            )
        })?;

        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(Mutex::new(log_file))
            .with_ansi(false)
            .with_timer(ChronoLocal::new("%m-%d %H:%M".to_string()))
            .with_filter(LevelFilter::DEBUG);

        tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer)
            .try_init()?;

        tracing::debug!("------------------------------");
        tracing::debug!(
            "Starting log for session {}",
            chrono::Local::now().format("%Y%m%d%H%M%S%6f")
        );
        Ok(())
    }
}

/// Prepares the export directory, writes the notebook template and converts
/// every note.
#[instrument(level = "debug", skip_all)]
fn export(settings: &Settings) -> anyhow::Result<()> {
    let export_dir = &settings.writer.export_dir;
    let writer = NoteWriter::new();

    // Writes into a directory that could not be created fail one by one and
    // are logged.
    if let Err(e) = ensure_export_dir(export_dir) {
        tracing::error!("{e}");
    }
    if let Err(e) = writer.write_notebook_template(export_dir) {
        tracing::error!("{e}");
    }

    let summary = Crawler::new(
        settings.crawler.root_dir.clone(),
        export_dir.clone(),
        &writer,
    )
    .crawl()?;

    println!(
        "{}",
        terminal::report(&summary, export_dir, terminal::supports_color())
    );
    Ok(())
}
