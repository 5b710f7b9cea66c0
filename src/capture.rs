//! Batch screenshot capture with a fixed-size worker pool.
//!
//! Each worker owns its own browser context; the only state shared between
//! workers is the saved-image counter. Completion order is unspecified.

use crate::geodesy;
use crate::progress::{emit_shared, ProgressEventKind, ProgressSender};
use crate::records::{self, LocationRecord, MAX_STEM_LEN};
use crate::renderer::Renderer;
use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Parallel capture sessions.
pub const DEFAULT_WORKERS: usize = 5;

const NAV_TIMEOUT_MS: u64 = 100_000;
const SELECTOR_TIMEOUT_MS: u64 = 10_000;
/// Delay for the photo viewer to render before the screenshot.
const PHOTO_SETTLE_MS: u64 = 1_000;

const CANVAS: &str = "canvas";
const PLACE_PHOTO: &str = r#"div[role="main"] img"#;

/// Result of a capture batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureReport {
    pub saved: u32,
    pub total: u32,
}

/// Capture a screenshot for every location, fanning out over `workers`
/// concurrent browser contexts.
pub async fn run_capture(
    renderer: &dyn Renderer,
    locations: &[LocationRecord],
    out_dir: &Path,
    workers: usize,
    progress: Option<ProgressSender>,
) -> Result<CaptureReport> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let total = locations.len() as u32;
    let saved = AtomicU32::new(0);
    let seq = AtomicU64::new(0);
    let progress = &progress;
    let saved_ref = &saved;
    let seq_ref = &seq;

    stream::iter(locations.iter().cloned())
        .map(|record| async move {
            match capture_one(renderer, &record, out_dir).await {
                Ok(path) => {
                    let n = saved_ref.fetch_add(1, Ordering::Relaxed) + 1;
                    tracing::debug!("captured {} -> {}", record.address, path.display());
                    emit_shared(
                        progress,
                        seq_ref,
                        ProgressEventKind::CaptureSaved { saved: n, total },
                    );
                }
                Err(e) => {
                    tracing::warn!("capture failed for {}: {e:#}", record.address);
                    emit_shared(
                        progress,
                        seq_ref,
                        ProgressEventKind::CaptureMissed {
                            address: record.address,
                        },
                    );
                }
            }
        })
        .buffer_unordered(workers.max(1))
        .collect::<Vec<()>>()
        .await;

    Ok(CaptureReport {
        saved: saved.load(Ordering::Relaxed),
        total,
    })
}

/// Capture a single location in a fresh context; the context is closed even
/// when the capture fails.
async fn capture_one(
    renderer: &dyn Renderer,
    record: &LocationRecord,
    out_dir: &Path,
) -> Result<PathBuf> {
    let mut context = renderer.new_context().await?;

    let result = async {
        context
            .navigate(
                &geodesy::maps_search_url(record.lat, record.lon),
                NAV_TIMEOUT_MS,
            )
            .await?;
        context.wait_for_selector(CANVAS, SELECTOR_TIMEOUT_MS).await?;

        // Open the place photo so the canvas shows the building, not the map.
        context
            .wait_for_selector(PLACE_PHOTO, SELECTOR_TIMEOUT_MS)
            .await?;
        context.click_selector(PLACE_PHOTO).await?;
        context.settle(PHOTO_SETTLE_MS).await;

        let path = records::unique_png_path(out_dir, &capture_stem(record))?;
        context.save_element_screenshot(CANVAS, &path).await?;
        Ok::<_, anyhow::Error>(path)
    }
    .await;

    let _ = context.close().await;
    result
}

/// File stem for a location's screenshot.
pub fn capture_stem(record: &LocationRecord) -> String {
    let stem = records::sanitize_file_stem(&record.address, MAX_STEM_LEN);
    if stem.is_empty() {
        format!("location_{}_{}", record.lat, record.lon)
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_stem_sanitizes_address() {
        let record = LocationRecord {
            address: "12/3 High St?".into(),
            lat: 1.0,
            lon: 2.0,
        };
        assert_eq!(capture_stem(&record), "12_3 High St_");
    }

    #[test]
    fn test_capture_stem_falls_back_to_coordinates() {
        let record = LocationRecord {
            address: "   ".into(),
            lat: 48.85,
            lon: 2.29,
        };
        assert_eq!(capture_stem(&record), "location_48.85_2.29");
    }
}
