//! Renderer abstraction for browser-driven page automation.
//!
//! Defines the `Renderer` and `RenderContext` traits that abstract over the
//! browser engine (currently Chromium via chromiumoxide), so the map probing
//! and capture layers stay testable without a real browser.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Browser-level failures surfaced to callers.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("navigation to {url} timed out after {timeout_ms}ms")]
    NavigationTimeout { url: String, timeout_ms: u64 },

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("screenshot failed: {0}")]
    ScreenshotFailed(String),
}

/// Mouse button for synthesized clicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
}

/// A browser engine that can create page contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Create a new browser context (tab).
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
    /// Shut down the browser engine.
    async fn shutdown(&self) -> Result<()>;
    /// Number of currently active contexts.
    fn active_contexts(&self) -> usize;
}

/// A single browser context (tab).
#[async_trait]
pub trait RenderContext: Send {
    /// Navigate to a URL with a timeout.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<()>;
    /// Reload the current page.
    async fn reload(&mut self) -> Result<()>;
    /// Execute JavaScript in the page context and return the result.
    async fn execute_js(&self, script: &str) -> Result<serde_json::Value>;
    /// Wait until an element matching `selector` exists.
    async fn wait_for_selector(&self, selector: &str, timeout_ms: u64) -> Result<()>;
    /// Text content of the first element matching `selector`, if present.
    async fn query_text(&self, selector: &str) -> Result<Option<String>>;
    /// Click the first element matching `selector`. `Ok(false)` when absent.
    async fn click_selector(&self, selector: &str) -> Result<bool>;
    /// Synthesize a raw mouse click at viewport coordinates.
    async fn mouse_click(&self, x: f64, y: f64, button: MouseButton) -> Result<()>;
    /// Screenshot the first element matching `selector` into a PNG file.
    async fn save_element_screenshot(&self, selector: &str, path: &Path) -> Result<()>;
    /// Let the page settle for `ms` milliseconds.
    async fn settle(&self, ms: u64);
    /// Close this context.
    async fn close(self: Box<Self>) -> Result<()>;
}
