//! Per-cell interaction: bounded retries with page-reload recovery.

use super::surface::MapSurface;
use crate::records::LocationRecord;
use anyhow::{anyhow, Result};

/// Attempts per cell before it is skipped.
pub const MAX_ATTEMPTS: u32 = 3;

/// Outcome of probing one grid cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellOutcome {
    /// A geocoded address was read.
    Found(LocationRecord),
    /// A marker sat under the cursor; not a plain building cell.
    Marker,
    /// The menu opened but no address could be read.
    NoAddress,
    /// All attempts failed.
    Exhausted { attempts: u32 },
}

/// Probe one cell, reloading the map between failed attempts.
///
/// Interaction errors never abort the scan; the worst case for a cell is
/// [`CellOutcome::Exhausted`].
pub async fn probe_cell(surface: &mut dyn MapSurface, x: i32, y: i32) -> CellOutcome {
    for attempt in 1..=MAX_ATTEMPTS {
        match try_probe(surface, x, y).await {
            Ok(outcome) => return outcome,
            Err(e) => {
                tracing::warn!(
                    "interaction error at ({x}, {y}), attempt {attempt}/{MAX_ATTEMPTS}: {e:#}"
                );
                if let Err(reopen) = surface.open().await {
                    tracing::warn!("map reload failed: {reopen:#}");
                }
            }
        }
    }
    tracing::warn!("giving up on cell ({x}, {y}) after {MAX_ATTEMPTS} attempts");
    CellOutcome::Exhausted {
        attempts: MAX_ATTEMPTS,
    }
}

async fn try_probe(surface: &mut dyn MapSurface, x: i32, y: i32) -> Result<CellOutcome> {
    let reply = surface.probe(x, y).await?;

    if reply.marker {
        surface.dismiss().await?;
        return Ok(CellOutcome::Marker);
    }

    let (lat, lon) = reply
        .coordinates
        .ok_or_else(|| anyhow!("context menu did not appear"))?;

    let outcome = match surface.read_address().await? {
        Some(address) => CellOutcome::Found(LocationRecord { address, lat, lon }),
        None => CellOutcome::NoAddress,
    };
    surface.dismiss().await?;
    Ok(outcome)
}
