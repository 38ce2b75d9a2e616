//! Single-slot holder for the most recent snapshot.
//!
//! The sampling loop publishes into the slot, and the status server reads from
//! it. Publishing replaces the previous value atomically and never waits for
//! readers.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::watch;

use super::SnapshotSink;
use crate::models::MeasurementSnapshot;

type Latest = Option<Arc<MeasurementSnapshot>>;

/// Write side of the latest-snapshot slot.
#[derive(Debug)]
pub struct SnapshotSlot {
    tx: watch::Sender<Latest>,
}

impl Default for SnapshotSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotSlot {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// A new read handle.
    #[must_use]
    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader {
            rx: self.tx.subscribe(),
        }
    }

    /// Replaces the stored snapshot (last writer wins).
    pub fn publish(&self, snapshot: Arc<MeasurementSnapshot>) {
        self.tx.send_replace(Some(snapshot));
    }
}

impl SnapshotSink for SnapshotSlot {
    fn name(&self) -> &'static str {
        "status"
    }

    fn accepts(&mut self, snapshot: &Arc<MeasurementSnapshot>) -> Result<()> {
        self.publish(Arc::clone(snapshot));
        Ok(())
    }
}

/// Read side of the latest-snapshot slot. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    rx: watch::Receiver<Latest>,
}

impl SnapshotReader {
    /// The most recently published snapshot, if any.
    #[must_use]
    pub fn latest(&self) -> Option<Arc<MeasurementSnapshot>> {
        self.rx.borrow().clone()
    }

    /// Waits until a snapshot newer than the last one seen is published.
    ///
    /// Returns `false` once the slot has been dropped.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}
