//! Terminal output for the end-of-run report

use std::path::Path;

use owo_colors::{OwoColorize, colors::css};
use yojimbo2tomboy::RunSummary;

/// Detects whether colored output should be enabled
pub fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

#[derive(Debug, Clone, Copy)]
enum Tone {
    Success,
    Warning,
}

fn paint(text: &str, tone: Tone, color: bool) -> String {
    match (color, tone) {
        (false, _) => text.to_string(),
        (true, Tone::Success) => text.fg::<css::Green>().to_string(),
        (true, Tone::Warning) => text.fg::<css::Orange>().to_string(),
    }
}

/// Summarises a finished export for the user.
///
/// Skipped files and failed writes get a warning line each; the detail is in
/// the log.
pub fn report(summary: &RunSummary, export_dir: &Path, color: bool) -> String {
    let mut lines = vec![paint(
        &format!(
            "Exported {} notes to {}",
            summary.written(),
            export_dir.display()
        ),
        Tone::Success,
        color,
    )];

    if summary.skipped > 0 {
        lines.push(paint(
            &format!("{} files skipped", summary.skipped),
            Tone::Warning,
            color,
        ));
    }
    if summary.failed > 0 {
        lines.push(paint(
            &format!("{} notes could not be written", summary.failed),
            Tone::Warning,
            color,
        ));
    }

    lines.join("\n")
}
