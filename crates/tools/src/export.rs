//! Paced hand-off of split segments to a sink.
//!
//! Segments go out one at a time with a fixed delay in between so the
//! receiving side (a file system, a sync folder, a device mount) is never
//! flooded. The first sink failure stops the run; nothing is retried.
//! A [`CancelHandle`] stops the run before the next hand-off.

use std::fmt;
use std::time::Duration;

use formats::GpxTrack;
use tokio::sync::watch;
use tracing::{info, warn};

/// Receives segments in order. `number` is one-based.
pub trait SegmentSink {
    fn deliver(&mut self, number: usize, segment: &GpxTrack) -> Result<(), String>;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub delivered: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    Sink {
        segment: usize,
        delivered: usize,
        skipped: usize,
        reason: String,
    },
    Cancelled {
        delivered: usize,
        skipped: usize,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Sink {
                segment,
                delivered,
                skipped,
                reason,
            } => write!(
                f,
                "segment {segment} failed: {reason} ({delivered} delivered, {skipped} not attempted)"
            ),
            ExportError::Cancelled { delivered, skipped } => {
                write!(f, "export cancelled ({delivered} delivered, {skipped} skipped)")
            }
        }
    }
}

impl std::error::Error for ExportError {}

#[derive(Debug, Clone)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    pub fn cancel(&self) {
        // No receivers left means the export already finished.
        let _ = self.0.send(true);
    }
}

pub struct PacedExporter {
    delay: Duration,
    cancelled: watch::Receiver<bool>,
}

impl PacedExporter {
    pub fn new(delay: Duration) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        (
            Self {
                delay,
                cancelled: rx,
            },
            CancelHandle(tx),
        )
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub async fn run<S: SegmentSink>(
        &mut self,
        segments: &[GpxTrack],
        sink: &mut S,
    ) -> Result<ExportReport, ExportError> {
        let total = segments.len();
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                tokio::select! {
                    _ = tokio::time::sleep(self.delay) => {}
                    _ = wait_cancelled(&mut self.cancelled) => {}
                }
            }
            if *self.cancelled.borrow() {
                warn!(delivered = i, skipped = total - i, "export cancelled");
                return Err(ExportError::Cancelled {
                    delivered: i,
                    skipped: total - i,
                });
            }

            let number = i + 1;
            if let Err(reason) = sink.deliver(number, segment) {
                warn!(segment = number, %reason, "segment hand-off failed");
                return Err(ExportError::Sink {
                    segment: number,
                    delivered: i,
                    skipped: total - number,
                    reason,
                });
            }
            info!(segment = number, of = total, name = %segment.name, "segment handed off");
        }

        Ok(ExportReport {
            delivered: total,
            skipped: 0,
        })
    }
}

async fn wait_cancelled(rx: &mut watch::Receiver<bool>) {
    while !*rx.borrow_and_update() {
        if rx.changed().await.is_err() {
            // Handle dropped: cancellation can no longer arrive.
            std::future::pending::<()>().await;
        }
    }
}
