//! Capture pool tests against a fake renderer.

use anyhow::{bail, Result};
use async_trait::async_trait;
use mapscout::capture::{run_capture, DEFAULT_WORKERS};
use mapscout::records::LocationRecord;
use mapscout::renderer::{MouseButton, RenderContext, Renderer};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Renderer whose contexts "screenshot" by writing a placeholder PNG.
/// Navigation to any URL containing `fail_marker` errors out.
struct FakeRenderer {
    contexts_opened: Arc<AtomicUsize>,
    contexts_closed: Arc<AtomicUsize>,
    fail_marker: Option<String>,
}

impl FakeRenderer {
    fn new(fail_marker: Option<&str>) -> Self {
        Self {
            contexts_opened: Arc::new(AtomicUsize::new(0)),
            contexts_closed: Arc::new(AtomicUsize::new(0)),
            fail_marker: fail_marker.map(String::from),
        }
    }
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        self.contexts_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeContext {
            closed_counter: Arc::clone(&self.contexts_closed),
            fail_marker: self.fail_marker.clone(),
        }))
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    fn active_contexts(&self) -> usize {
        self.contexts_opened.load(Ordering::SeqCst)
            - self.contexts_closed.load(Ordering::SeqCst)
    }
}

struct FakeContext {
    closed_counter: Arc<AtomicUsize>,
    fail_marker: Option<String>,
}

#[async_trait]
impl RenderContext for FakeContext {
    async fn navigate(&mut self, url: &str, _timeout_ms: u64) -> Result<()> {
        if let Some(marker) = &self.fail_marker {
            if url.contains(marker.as_str()) {
                bail!("navigation refused for {url}");
            }
        }
        Ok(())
    }

    async fn reload(&mut self) -> Result<()> {
        Ok(())
    }

    async fn execute_js(&self, _script: &str) -> Result<serde_json::Value> {
        Ok(serde_json::Value::Null)
    }

    async fn wait_for_selector(&self, _selector: &str, _timeout_ms: u64) -> Result<()> {
        Ok(())
    }

    async fn query_text(&self, _selector: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn click_selector(&self, _selector: &str) -> Result<bool> {
        Ok(true)
    }

    async fn mouse_click(&self, _x: f64, _y: f64, _button: MouseButton) -> Result<()> {
        Ok(())
    }

    async fn save_element_screenshot(&self, _selector: &str, path: &Path) -> Result<()> {
        std::fs::write(path, b"\x89PNG\r\n\x1a\n")?;
        Ok(())
    }

    async fn settle(&self, _ms: u64) {}

    async fn close(self: Box<Self>) -> Result<()> {
        self.closed_counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn record(address: &str, lat: f64, lon: f64) -> LocationRecord {
    LocationRecord {
        address: address.into(),
        lat,
        lon,
    }
}

#[tokio::test]
async fn captures_every_location_and_closes_contexts() {
    let renderer = FakeRenderer::new(None);
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("buildings");

    let locations = vec![
        record("1 Alpha St", 48.85, 2.29),
        record("2 Beta Ave", 48.86, 2.30),
        record("3 Gamma Rd", 48.87, 2.31),
    ];

    let report = run_capture(&renderer, &locations, &out, DEFAULT_WORKERS, None)
        .await
        .unwrap();

    assert_eq!(report.saved, 3);
    assert_eq!(report.total, 3);
    assert_eq!(renderer.active_contexts(), 0, "context leaked");

    for name in ["1 Alpha St.png", "2 Beta Ave.png", "3 Gamma Rd.png"] {
        assert!(out.join(name).exists(), "missing {name}");
    }
}

#[tokio::test]
async fn failed_navigation_is_reported_not_fatal() {
    // Coordinates of the second record appear in its search URL.
    let renderer = FakeRenderer::new(Some("33.33"));
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("buildings");

    let locations = vec![
        record("1 Alpha St", 48.85, 2.29),
        record("99 Broken Way", 33.33, 44.44),
    ];

    let report = run_capture(&renderer, &locations, &out, 2, None)
        .await
        .unwrap();

    assert_eq!(report.saved, 1);
    assert_eq!(report.total, 2);
    assert!(out.join("1 Alpha St.png").exists());
    assert!(!out.join("99 Broken Way.png").exists());
    assert_eq!(renderer.active_contexts(), 0, "context leaked");
}

#[tokio::test]
async fn duplicate_addresses_get_suffixed_file_names() {
    let renderer = FakeRenderer::new(None);
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("buildings");

    let locations = vec![
        record("12 Twin St", 10.0, 20.0),
        record("12 Twin St", 10.0, 20.001),
    ];

    // Single worker keeps the collision handling deterministic.
    let report = run_capture(&renderer, &locations, &out, 1, None)
        .await
        .unwrap();

    assert_eq!(report.saved, 2);
    assert!(out.join("12 Twin St.png").exists());
    assert!(out.join("12 Twin St_1.png").exists());
}

#[tokio::test]
async fn empty_input_produces_empty_report() {
    let renderer = FakeRenderer::new(None);
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("buildings");

    let report = run_capture(&renderer, &[], &out, DEFAULT_WORKERS, None)
        .await
        .unwrap();

    assert_eq!(report.saved, 0);
    assert_eq!(report.total, 0);
    assert!(out.exists(), "output directory was not created");
}
