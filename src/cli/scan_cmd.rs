//! `mapscout scan`: enumerate building addresses around a point.

use crate::cli::output::{self, Styled};
use crate::cli::prompt;
use crate::geodesy;
use crate::progress::{self, ProgressEventKind, ProgressReceiver};
use crate::records::{self, RecordWriter};
use crate::renderer::chromium::ChromiumRenderer;
use crate::renderer::Renderer;
use crate::scan::maps::GoogleMapsSurface;
use crate::scan::{self, ScanConfig};
use anyhow::{ensure, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rustyline::DefaultEditor;
use std::path::Path;
use tokio::sync::broadcast::error::RecvError;

/// Run the scan command. Missing inputs are prompted for interactively.
pub async fn run(
    lat: Option<f64>,
    lon: Option<f64>,
    radius: Option<f64>,
    headless: bool,
) -> Result<()> {
    let s = Styled::new();
    let (lat, lon, radius_km) = resolve_inputs(lat, lon, radius)?;
    let config = ScanConfig::new(lat, lon, radius_km);

    std::fs::create_dir_all(records::LOCATIONS_DIR)
        .with_context(|| format!("failed to create {}/", records::LOCATIONS_DIR))?;
    let path = records::unique_csv_path(Path::new(records::LOCATIONS_DIR), "locations");
    let mut writer = RecordWriter::create(path.clone())?;

    if !output::is_quiet() {
        eprintln!(
            "  {} Opening the map at {} (zoom {})...",
            s.ok_sym(),
            s.accent(&format!("{lat}, {lon}")),
            config.zoom
        );
    }

    let renderer = ChromiumRenderer::launch(headless).await?;
    let context = renderer.new_context().await?;
    let mut surface = GoogleMapsSurface::new(context, lat, lon, config.zoom);

    let (tx, rx) = progress::channel();
    let reporter = (!output::is_quiet()).then(|| tokio::spawn(render_progress(rx)));

    // run_scan owns the sender; dropping it on return ends the reporter.
    let outcome = scan::run_scan(&mut surface, &config, &mut writer, Some(tx)).await;

    if let Some(handle) = reporter {
        let _ = handle.await;
    }
    let _ = surface.into_context().close().await;
    renderer.shutdown().await?;
    let outcome = outcome?;

    if !output::is_quiet() {
        eprintln!(
            "  {} Found {} buildings within {radius_km} km ({} cells, {} skipped).",
            s.ok_sym(),
            s.accent(&outcome.found.to_string()),
            outcome.cells_visited,
            outcome.cells_skipped,
        );
        eprintln!("  {} Result saved in {}", s.ok_sym(), path.display());
    }
    Ok(())
}

fn resolve_inputs(
    lat: Option<f64>,
    lon: Option<f64>,
    radius: Option<f64>,
) -> Result<(f64, f64, f64)> {
    if let (Some(lat), Some(lon), Some(radius)) = (lat, lon, radius) {
        ensure!(geodesy::valid_lat(lat), "latitude must be in [-90, 90]");
        ensure!(geodesy::valid_lon(lon), "longitude must be in [-180, 180]");
        ensure!(
            geodesy::valid_radius_km(radius),
            "radius must be in [{}, {}] km",
            geodesy::MIN_RADIUS_KM,
            geodesy::MAX_RADIUS_KM
        );
        return Ok((lat, lon, radius));
    }

    let mut editor = DefaultEditor::new()?;
    let lat = match lat {
        Some(v) => {
            ensure!(geodesy::valid_lat(v), "latitude must be in [-90, 90]");
            v
        }
        None => prompt::read_validated(
            &mut editor,
            "Enter latitude: ",
            "Latitude must be a number in [-90, 90].",
            |s| s.parse().ok().filter(|v| geodesy::valid_lat(*v)),
        )?,
    };
    let lon = match lon {
        Some(v) => {
            ensure!(geodesy::valid_lon(v), "longitude must be in [-180, 180]");
            v
        }
        None => prompt::read_validated(
            &mut editor,
            "Enter longitude: ",
            "Longitude must be a number in [-180, 180].",
            |s| s.parse().ok().filter(|v| geodesy::valid_lon(*v)),
        )?,
    };
    let radius = match radius {
        Some(v) => {
            ensure!(geodesy::valid_radius_km(v), "radius out of range");
            v
        }
        None => prompt::read_validated(
            &mut editor,
            "Enter radius (km): ",
            "Radius must be a number in [0.01, 10000] km.",
            |s| s.parse().ok().filter(|v| geodesy::valid_radius_km(*v)),
        )?,
    };
    Ok((lat, lon, radius))
}

/// Drive one progress bar per scan phase from the event stream.
async fn render_progress(mut rx: ProgressReceiver) {
    let mut bar: Option<ProgressBar> = None;

    loop {
        let event = match rx.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        };

        match event.event {
            ProgressEventKind::PhaseStarted { phase, total_hint } => {
                if let Some(b) = bar.take() {
                    b.finish_and_clear();
                }
                let b = match total_hint {
                    Some(total) => ProgressBar::new(total),
                    None => ProgressBar::new_spinner(),
                };
                b.set_style(
                    ProgressStyle::with_template("  {msg:30} {bar:30} {pos}/{len}")
                        .unwrap_or_else(|_| ProgressStyle::default_bar()),
                );
                b.set_message(phase.to_string());
                bar = Some(b);
            }
            ProgressEventKind::BoundProbed {
                phase, distance_km, ..
            } => {
                if let Some(b) = &bar {
                    b.inc(1);
                    b.set_message(format!("{phase} · {distance_km:.2} km"));
                }
            }
            ProgressEventKind::CellProbed { .. } => {
                if let Some(b) = &bar {
                    b.inc(1);
                }
            }
            ProgressEventKind::AddressFound { address, total } => {
                if let Some(b) = &bar {
                    b.set_message(format!("{total} found · {address}"));
                }
            }
            ProgressEventKind::PhaseCompleted { .. } => {
                if let Some(b) = bar.take() {
                    b.finish_and_clear();
                }
            }
            _ => {}
        }
    }

    if let Some(b) = bar {
        b.finish_and_clear();
    }
}
