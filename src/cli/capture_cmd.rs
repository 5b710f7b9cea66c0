//! `mapscout capture`: batch screenshot capture for a locations file.

use crate::capture::{self, CaptureReport};
use crate::cli::output::{self, Styled};
use crate::cli::prompt;
use crate::progress::{self, ProgressEventKind, ProgressReceiver};
use crate::records;
use crate::renderer::chromium::ChromiumRenderer;
use crate::renderer::Renderer;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rustyline::DefaultEditor;
use std::path::{Path, PathBuf};
use tokio::sync::broadcast::error::RecvError;

/// Run the capture command for a CSV file in the locations/ directory.
pub async fn run(file: Option<&str>, workers: usize, headless: bool) -> Result<()> {
    let s = Styled::new();
    let path = resolve_file(file)?;
    let locations = records::read_records(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    if locations.is_empty() {
        eprintln!("  {} {} contains no locations.", s.warn_sym(), path.display());
        return Ok(());
    }

    if !output::is_quiet() {
        eprintln!(
            "  {} Capturing {} locations with {workers} workers...",
            s.ok_sym(),
            s.accent(&locations.len().to_string()),
        );
    }

    let renderer = ChromiumRenderer::launch(headless).await?;
    let (tx, rx) = progress::channel();
    let reporter = (!output::is_quiet())
        .then(|| tokio::spawn(render_progress(rx, locations.len() as u64)));

    let report = capture::run_capture(
        &renderer,
        &locations,
        Path::new(records::BUILDINGS_DIR),
        workers,
        Some(tx),
    )
    .await;

    if let Some(handle) = reporter {
        let _ = handle.await;
    }
    renderer.shutdown().await?;
    let report = report?;

    print_summary(&s, &report);
    Ok(())
}

fn print_summary(s: &Styled, report: &CaptureReport) {
    if output::is_quiet() {
        return;
    }
    let sym = if report.saved == report.total {
        s.ok_sym()
    } else {
        s.warn_sym()
    };
    eprintln!(
        "  {sym} Saved {}/{} images in {}/",
        report.saved,
        report.total,
        records::BUILDINGS_DIR
    );
}

/// Resolve the input file, prompting when no name was given on the command
/// line. Names are taken relative to locations/.
fn resolve_file(file: Option<&str>) -> Result<PathBuf> {
    let dir = Path::new(records::LOCATIONS_DIR);
    if let Some(name) = file {
        let path = dir.join(name);
        anyhow::ensure!(path.exists(), "file does not exist: {}", path.display());
        return Ok(path);
    }

    let mut editor = DefaultEditor::new()?;
    prompt::read_validated(
        &mut editor,
        "Enter a CSV file name from locations/: ",
        "File not found in locations/.",
        |s| {
            let path = dir.join(s);
            path.exists().then_some(path)
        },
    )
}

/// Tick a single progress bar as capture results arrive.
async fn render_progress(mut rx: ProgressReceiver, total: u64) {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template("  {msg:30} {bar:30} {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.set_message("Capture");

    loop {
        let event = match rx.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        };
        match event.event {
            ProgressEventKind::CaptureSaved { .. } => bar.inc(1),
            ProgressEventKind::CaptureMissed { address } => {
                bar.inc(1);
                bar.set_message(format!("Capture · missed {address}"));
            }
            _ => {}
        }
    }
    bar.finish_and_clear();
}
