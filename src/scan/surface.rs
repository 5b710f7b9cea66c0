//! The map surface seam: semantic operations the scan engine needs from the
//! rendered map, independent of the browser engine.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Pixel rectangle of the rendered map canvas in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// What a right-click probe on one cell revealed.
///
/// The context menu and the marker cursor are independent observations: a
/// probe over a marker usually still opens a readable menu.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeReply {
    /// Coordinates from the context menu's first row, when it appeared.
    pub coordinates: Option<(f64, f64)>,
    /// The cursor reported a clickable marker under the probe point.
    pub marker: bool,
}

/// Semantic operations on the rendered map. All pixel arguments are
/// canvas-relative; implementations add the canvas origin themselves.
#[async_trait]
pub trait MapSurface: Send {
    /// Navigate to the map view and strip overlay chrome. Also used to
    /// recover after a failed interaction or a place-panel navigation.
    async fn open(&mut self) -> Result<()>;

    /// Bounding box of the map canvas.
    async fn canvas_box(&mut self) -> Result<PixelBox>;

    /// Right-click at canvas pixel `(x, y)` and read the context menu.
    async fn probe(&mut self, x: i32, y: i32) -> Result<ProbeReply>;

    /// Dismiss whatever the last probe opened.
    async fn dismiss(&mut self) -> Result<()>;

    /// Follow the open context menu's address entry and read the address.
    /// `Ok(None)` when no address could be extracted.
    async fn read_address(&mut self) -> Result<Option<String>>;
}
