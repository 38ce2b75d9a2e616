//! Consumers of published measurement snapshots.
//!
//! Each cycle's snapshot is handed to every registered sink in turn. A sink
//! failure is logged by the sampling loop and never stops it.

pub mod console;
pub mod display;
pub mod status;

pub use console::ConsoleSink;
pub use display::{DisplayPanel, DisplaySink, TextPanel};
pub use status::{SnapshotReader, SnapshotSlot};

use anyhow::Result;
use std::sync::Arc;

use crate::models::MeasurementSnapshot;

/// Something that wants to see every snapshot.
pub trait SnapshotSink: Send {
    /// Short name used in log messages.
    fn name(&self) -> &'static str;

    /// Receives one snapshot. The snapshot is shared and read-only.
    fn accepts(&mut self, snapshot: &Arc<MeasurementSnapshot>) -> Result<()>;
}
