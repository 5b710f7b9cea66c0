// Copyright 2026 Mapscout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Progress event types and broadcast channel for long-running operations.
//!
//! The scan engine and the capture pool emit `ProgressEvent`s which flow
//! through a `tokio::sync::broadcast` channel to all subscribers (terminal
//! bars, logs). When no subscriber exists, events are silently dropped.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A progress event emitted during a scan or a capture batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Monotonically increasing sequence number.
    pub seq: u64,
    /// The kind of progress event.
    pub event: ProgressEventKind,
}

/// The specific kind of progress event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProgressEventKind {
    /// A scan phase has started. `total_hint` is the expected step count,
    /// when one can be estimated up front.
    PhaseStarted {
        phase: ScanPhase,
        total_hint: Option<u64>,
    },
    /// A scan phase finished.
    PhaseCompleted { phase: ScanPhase, detail: String },
    /// One bounding-box probe step along an axis.
    BoundProbed {
        phase: ScanPhase,
        steps: u32,
        distance_km: f64,
    },
    /// One spiral cell was probed (regardless of outcome).
    CellProbed { x: i32, y: i32 },
    /// A new address was written to the output file.
    AddressFound { address: String, total: u32 },
    /// A cell was abandoned after exhausting its retries.
    CellSkipped { x: i32, y: i32, attempts: u32 },
    /// One location image was saved.
    CaptureSaved { saved: u32, total: u32 },
    /// One location could not be captured.
    CaptureMissed { address: String },
    /// A non-fatal warning occurred.
    Warning { message: String },
    /// The scan finished.
    ScanComplete {
        found: u32,
        cells: u32,
        elapsed_ms: u64,
    },
}

/// Identifies which scan phase is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanPhase {
    /// Westward probe for the horizontal extent of the scan window.
    BoundsX,
    /// Northward probe for the vertical extent of the scan window.
    BoundsY,
    /// Spiral traversal over the discovered window.
    Area,
    /// Batch screenshot capture.
    Capture,
}

impl std::fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BoundsX => write!(f, "X bound"),
            Self::BoundsY => write!(f, "Y bound"),
            Self::Area => write!(f, "Area scan"),
            Self::Capture => write!(f, "Capture"),
        }
    }
}

/// Sender handle for emitting progress events.
///
/// Backed by a `tokio::sync::broadcast` channel so multiple listeners can
/// subscribe independently. When no listeners exist, `send()` returns an
/// error which we silently ignore.
pub type ProgressSender = tokio::sync::broadcast::Sender<ProgressEvent>;

/// Receiver handle for consuming progress events.
pub type ProgressReceiver = tokio::sync::broadcast::Receiver<ProgressEvent>;

/// Create a new progress broadcast channel with a bounded buffer.
///
/// 256 events cover the steady state; a slow subscriber drops the oldest
/// events instead of stalling the scan.
pub fn channel() -> (ProgressSender, ProgressReceiver) {
    tokio::sync::broadcast::channel(256)
}

/// Emit a progress event, silently ignoring send errors (which occur when no
/// receivers are listening).
pub fn emit(tx: &Option<ProgressSender>, seq: &mut u64, event: ProgressEventKind) {
    if let Some(sender) = tx {
        *seq += 1;
        let _ = sender.send(ProgressEvent { seq: *seq, event });
    }
}

/// Variant of [`emit`] for concurrent emitters sharing one sequence counter.
pub fn emit_shared(tx: &Option<ProgressSender>, seq: &AtomicU64, event: ProgressEventKind) {
    if let Some(sender) = tx {
        let seq = seq.fetch_add(1, Ordering::Relaxed) + 1;
        let _ = sender.send(ProgressEvent { seq, event });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_event_serialization() {
        let event = ProgressEvent {
            seq: 1,
            event: ProgressEventKind::PhaseStarted {
                phase: ScanPhase::BoundsX,
                total_hint: Some(40),
            },
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("BoundsX"));
        assert!(json.contains("PhaseStarted"));

        let parsed: ProgressEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.seq, 1);
    }

    #[test]
    fn test_scan_complete_serialization() {
        let event = ProgressEvent {
            seq: 10,
            event: ProgressEventKind::ScanComplete {
                found: 156,
                cells: 420,
                elapsed_ms: 8200,
            },
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("156"));
        assert!(json.contains("ScanComplete"));
    }

    #[test]
    fn test_channel_no_receivers() {
        let (tx, rx) = channel();
        drop(rx); // No receivers
                  // Should not panic
        emit(
            &Some(tx),
            &mut 0,
            ProgressEventKind::Warning {
                message: "test".to_string(),
            },
        );
    }

    #[test]
    fn test_emit_none_sender() {
        // Should be a no-op
        emit(
            &None,
            &mut 0,
            ProgressEventKind::Warning {
                message: "test".to_string(),
            },
        );
    }

    #[test]
    fn test_emit_shared_increments_sequence() {
        let (tx, mut rx) = channel();
        let seq = AtomicU64::new(0);
        emit_shared(
            &Some(tx.clone()),
            &seq,
            ProgressEventKind::CaptureSaved { saved: 1, total: 2 },
        );
        emit_shared(
            &Some(tx),
            &seq,
            ProgressEventKind::CaptureSaved { saved: 2, total: 2 },
        );
        assert_eq!(rx.try_recv().unwrap().seq, 1);
        assert_eq!(rx.try_recv().unwrap().seq, 2);
    }

    #[test]
    fn test_scan_phase_display() {
        assert_eq!(ScanPhase::BoundsX.to_string(), "X bound");
        assert_eq!(ScanPhase::Area.to_string(), "Area scan");
        assert_eq!(ScanPhase::Capture.to_string(), "Capture");
    }
}
