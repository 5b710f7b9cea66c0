//! Google Maps choreography: selectors, menus, and overlay cleanup.
//!
//! Everything here is an empirical contract with the live maps frontend.
//! When a scan stops finding context menus, these selectors are the first
//! thing to re-check against the current markup.

use super::surface::{MapSurface, PixelBox, ProbeReply};
use crate::geodesy;
use crate::renderer::{MouseButton, RenderContext};
use anyhow::{ensure, Context, Result};
use async_trait::async_trait;

const NAV_TIMEOUT_MS: u64 = 100_000;
const SELECTOR_TIMEOUT_MS: u64 = 10_000;

/// Delay for the page to settle after navigation or a UI toggle.
const SETTLE_MS: u64 = 3_000;
/// Delay for the context menu or dialog to render after a click.
const MENU_SETTLE_MS: u64 = 1_000;

const CANVAS: &str = "canvas";
const SIDEBAR_MORE: &str = r#"button[jsaction="navigationrail.more"]"#;
const SIDEBAR_TOGGLE: &str = r#"button[jsaction="settings.toggleSideBar"]"#;
const SIDEBAR_CLOSE: &str = r#"button[jsaction="settings.close"]"#;
/// First context-menu row: the clicked coordinates as "lat, lon".
const MENU_COORDS: &str = r#"div[data-index="0"]"#;
/// Context-menu row that opens the address dialog.
const MENU_ADDRESS: &str = r#"div[data-index="4"]"#;
const LIVE_DIALOG_BUTTON: &str = r#"div[aria-live="assertive"] div[role="dialog"] button"#;
const PLACE_ADDRESS: &str = r#"div[role="main"] button[data-item-id="address"]"#;

/// The live map page driven through a [`RenderContext`].
pub struct GoogleMapsSurface {
    context: Box<dyn RenderContext>,
    lat: f64,
    lon: f64,
    zoom: u8,
    canvas: Option<PixelBox>,
}

impl GoogleMapsSurface {
    pub fn new(context: Box<dyn RenderContext>, lat: f64, lon: f64, zoom: u8) -> Self {
        Self {
            context,
            lat,
            lon,
            zoom,
            canvas: None,
        }
    }

    /// Hand the browser context back, e.g. for closing.
    pub fn into_context(self) -> Box<dyn RenderContext> {
        self.context
    }

    /// Collapse the search sidebar so it cannot swallow canvas clicks.
    async fn collapse_sidebar(&mut self) -> Result<()> {
        self.context.settle(SETTLE_MS).await;
        if !self.context.click_selector(SIDEBAR_MORE).await? {
            anyhow::bail!("navigation rail menu not found");
        }
        self.context.settle(SETTLE_MS).await;

        let checked = self
            .context
            .execute_js(&format!(
                "(() => {{ const b = document.querySelector('{SIDEBAR_TOGGLE}'); \
                 return !!b && b.getAttribute('aria-checked') === 'true'; }})()"
            ))
            .await?;
        if checked.as_bool().unwrap_or(false) {
            self.context.click_selector(SIDEBAR_TOGGLE).await?;
        }
        self.context.click_selector(SIDEBAR_CLOSE).await?;
        Ok(())
    }

    /// Drop the travel-mode menu and the chip row; both overlay the canvas.
    async fn remove_overlays(&mut self) {
        self.context.settle(SETTLE_MS).await;
        let _ = self
            .context
            .execute_js(
                "(() => { for (const id of ['itamenu', 'assistive-chips']) { \
                 const n = document.getElementById(id); if (n) n.remove(); } return true; })()",
            )
            .await;
    }
}

#[async_trait]
impl MapSurface for GoogleMapsSurface {
    async fn open(&mut self) -> Result<()> {
        tracing::debug!("opening map at ({}, {}) zoom {}", self.lat, self.lon, self.zoom);
        self.context
            .navigate(
                &geodesy::maps_view_url(self.lat, self.lon, self.zoom),
                NAV_TIMEOUT_MS,
            )
            .await?;
        self.context
            .wait_for_selector(CANVAS, SELECTOR_TIMEOUT_MS)
            .await?;

        if let Err(e) = self.collapse_sidebar().await {
            tracing::warn!("could not collapse sidebar: {e:#}");
        }
        self.remove_overlays().await;

        // The canvas can move when overlays disappear; re-measure lazily.
        self.canvas = None;
        Ok(())
    }

    async fn canvas_box(&mut self) -> Result<PixelBox> {
        if let Some(canvas) = self.canvas {
            return Ok(canvas);
        }
        let value = self
            .context
            .execute_js(
                "(() => { const c = document.querySelector('canvas'); if (!c) return null; \
                 const r = c.getBoundingClientRect(); \
                 return { x: r.x, y: r.y, width: r.width, height: r.height }; })()",
            )
            .await?;
        let canvas: PixelBox =
            serde_json::from_value(value).context("map canvas bounding box missing")?;
        self.canvas = Some(canvas);
        Ok(canvas)
    }

    async fn probe(&mut self, x: i32, y: i32) -> Result<ProbeReply> {
        let canvas = self.canvas_box().await?;
        self.context
            .mouse_click(canvas.x + f64::from(x), canvas.y + f64::from(y), MouseButton::Right)
            .await?;
        self.context.settle(MENU_SETTLE_MS).await;

        // A pointer cursor over the app surface means a marker took the click.
        let marker = self
            .context
            .execute_js(
                "(() => { const el = document.querySelector('div[role=\"application\"]'); \
                 return !!el && el.style.cursor === 'pointer'; })()",
            )
            .await
            .map(|v| v.as_bool().unwrap_or(false))
            .unwrap_or(false);

        let coordinates = match self.context.query_text(MENU_COORDS).await? {
            Some(text) => parse_menu_coordinates(&text),
            None => None,
        };

        Ok(ProbeReply {
            coordinates,
            marker,
        })
    }

    async fn dismiss(&mut self) -> Result<()> {
        let canvas = self.canvas_box().await?;
        // A left click near the canvas corner closes any open menu or dialog.
        self.context
            .mouse_click(canvas.x + 5.0, canvas.y + 5.0, MouseButton::Left)
            .await
    }

    async fn read_address(&mut self) -> Result<Option<String>> {
        ensure!(
            self.context.click_selector(MENU_ADDRESS).await?,
            "context menu address entry missing"
        );
        self.context.settle(MENU_SETTLE_MS).await;

        let dialog_address = self.context.query_text(LIVE_DIALOG_BUTTON).await?;

        // The click can also navigate into a full place panel, with or
        // without the dialog. The panel's address item wins when both are
        // present, and the map must be reopened because the panel replaced
        // the view.
        let panel_visible = self
            .context
            .execute_js(
                "(() => { const el = document.querySelector('div[role=\"main\"]'); \
                 return !!el && el.offsetWidth > 0; })()",
            )
            .await
            .map(|v| v.as_bool().unwrap_or(false))
            .unwrap_or(false);

        if !panel_visible {
            return Ok(dialog_address);
        }

        tracing::debug!("place panel opened, reading its address item");
        let panel_address = self
            .context
            .query_text(PLACE_ADDRESS)
            .await?
            // The address item leads with an icon glyph
            .map(|text| text.chars().skip(1).collect::<String>())
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());
        self.open().await?;
        Ok(panel_address.or(dialog_address))
    }
}

/// Parse a context-menu coordinate row like `"48.858370, 2.294481"`.
pub fn parse_menu_coordinates(text: &str) -> Option<(f64, f64)> {
    let (lat, lon) = text.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;
    (geodesy::valid_lat(lat) && geodesy::valid_lon(lon)).then_some((lat, lon))
}
