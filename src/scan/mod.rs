// Copyright 2026 Mapscout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Spatial scan engine: bounding-box discovery, spiral traversal, and the
//! per-cell probe loop.
//!
//! The engine only talks to the map through the [`surface::MapSurface`]
//! trait, so its geometry and retry semantics are testable without a
//! browser.

pub mod maps;
pub mod probe;
pub mod spiral;
pub mod surface;

use crate::geodesy;
use crate::progress::{emit, ProgressEventKind, ProgressSender, ScanPhase};
use crate::records::RecordWriter;
use anyhow::Result;
use probe::CellOutcome;
use spiral::{Spiral, Window};
use std::time::Instant;
use surface::MapSurface;

/// Pixels between probed grid cells during the spiral phase.
pub const CELL_STEP: i32 = 5;

/// Canvas margin excluded from horizontal bound discovery; UI chrome
/// overlays the left edge.
const X_MARGIN: i32 = 100;
/// Canvas margin excluded from vertical bound discovery.
const Y_MARGIN: i32 = 120;

/// Parameters of one scan invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanConfig {
    pub lat: f64,
    pub lon: f64,
    pub radius_km: f64,
    pub zoom: u8,
}

impl ScanConfig {
    pub fn new(lat: f64, lon: f64, radius_km: f64) -> Self {
        Self {
            lat,
            lon,
            radius_km,
            zoom: geodesy::zoom_for_radius(radius_km),
        }
    }
}

/// Summary of a finished scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Addresses written to the output file.
    pub found: u32,
    /// Spiral cells visited.
    pub cells_visited: u32,
    /// Cells abandoned after exhausting retries.
    pub cells_skipped: u32,
    /// The discovered scan window.
    pub window: Window,
}

/// Run a full scan: discover the window, spiral over it, and append every
/// address found to `writer`.
pub async fn run_scan(
    surface: &mut dyn MapSurface,
    config: &ScanConfig,
    writer: &mut RecordWriter,
    progress: Option<ProgressSender>,
) -> Result<ScanOutcome> {
    let started = Instant::now();
    let mut seq = 0u64;

    surface.open().await?;
    let canvas = surface.canvas_box().await?;
    let width = canvas.width as i32;
    let height = canvas.height as i32;
    let (cx, cy) = (width / 2, height / 2);

    // One bound probe per zoom-level pixel step; coarser zoom means coarser
    // steps and fewer probes.
    let step = i32::from(config.zoom.max(1));

    let max_x_steps = ((cx - X_MARGIN) / step).max(0) as u32;
    emit(
        &progress,
        &mut seq,
        ProgressEventKind::PhaseStarted {
            phase: ScanPhase::BoundsX,
            total_hint: Some(u64::from(max_x_steps)),
        },
    );
    let x_extent =
        discover_bound(surface, config, (cx, cy), (-1, 0), step, max_x_steps, ScanPhase::BoundsX, &progress, &mut seq)
            .await?;
    surface.dismiss().await?;
    emit(
        &progress,
        &mut seq,
        ProgressEventKind::PhaseCompleted {
            phase: ScanPhase::BoundsX,
            detail: format!("{x_extent}px"),
        },
    );

    let max_y_steps = ((cy - Y_MARGIN) / step).max(0) as u32;
    emit(
        &progress,
        &mut seq,
        ProgressEventKind::PhaseStarted {
            phase: ScanPhase::BoundsY,
            total_hint: Some(u64::from(max_y_steps)),
        },
    );
    let y_extent =
        discover_bound(surface, config, (cx, cy), (0, -1), step, max_y_steps, ScanPhase::BoundsY, &progress, &mut seq)
            .await?;
    surface.dismiss().await?;
    emit(
        &progress,
        &mut seq,
        ProgressEventKind::PhaseCompleted {
            phase: ScanPhase::BoundsY,
            detail: format!("{y_extent}px"),
        },
    );

    let window = Window {
        x_min: cx - x_extent,
        x_max: cx + x_extent,
        y_min: cy - y_extent,
        y_max: cy + y_extent,
    };
    tracing::info!(
        "scan window: x {}..{}, y {}..{} ({} cells max)",
        window.x_min,
        window.x_max,
        window.y_min,
        window.y_max,
        window.cell_count(CELL_STEP)
    );

    emit(
        &progress,
        &mut seq,
        ProgressEventKind::PhaseStarted {
            phase: ScanPhase::Area,
            total_hint: Some(window.cell_count(CELL_STEP)),
        },
    );

    let mut found = 0u32;
    let mut cells_visited = 0u32;
    let mut cells_skipped = 0u32;

    for (x, y) in Spiral::new(width, height, window, CELL_STEP) {
        cells_visited += 1;
        emit(&progress, &mut seq, ProgressEventKind::CellProbed { x, y });

        match probe::probe_cell(surface, x, y).await {
            CellOutcome::Found(record) => {
                writer.append(&record)?;
                found += 1;
                emit(
                    &progress,
                    &mut seq,
                    ProgressEventKind::AddressFound {
                        address: record.address,
                        total: found,
                    },
                );
            }
            CellOutcome::Marker | CellOutcome::NoAddress => {}
            CellOutcome::Exhausted { attempts } => {
                cells_skipped += 1;
                emit(
                    &progress,
                    &mut seq,
                    ProgressEventKind::CellSkipped { x, y, attempts },
                );
            }
        }
    }

    let elapsed_ms = started.elapsed().as_millis() as u64;
    emit(
        &progress,
        &mut seq,
        ProgressEventKind::ScanComplete {
            found,
            cells: cells_visited,
            elapsed_ms,
        },
    );
    tracing::info!("scan complete: {found} addresses over {cells_visited} cells in {elapsed_ms}ms");

    Ok(ScanOutcome {
        found,
        cells_visited,
        cells_skipped,
        window,
    })
}

/// Walk outward from the canvas center along `dir`, one `step` at a time,
/// until the probed coordinates fall outside the radius, the menu becomes
/// unreadable, or `max_steps` is exhausted. Returns the confirmed extent in
/// pixels.
#[allow(clippy::too_many_arguments)]
async fn discover_bound(
    surface: &mut dyn MapSurface,
    config: &ScanConfig,
    center: (i32, i32),
    dir: (i32, i32),
    step: i32,
    max_steps: u32,
    phase: ScanPhase,
    progress: &Option<ProgressSender>,
    seq: &mut u64,
) -> Result<i32> {
    let (mut x, mut y) = center;
    let mut extent = 0;

    for n in 0..max_steps {
        let reply = surface.probe(x, y).await?;
        surface.dismiss().await?;

        let Some(coordinates) = reply.coordinates else {
            tracing::debug!("{phase}: menu unreadable at step {n}, stopping");
            break;
        };

        let distance_km = geodesy::distance_km((config.lat, config.lon), coordinates);
        emit(
            progress,
            seq,
            ProgressEventKind::BoundProbed {
                phase,
                steps: n + 1,
                distance_km,
            },
        );

        if distance_km > config.radius_km {
            break;
        }

        extent += step;
        x += dir.0 * step;
        y += dir.1 * step;
    }

    Ok(extent)
}
