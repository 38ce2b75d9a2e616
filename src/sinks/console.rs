//! Plain-text per-cycle report.

use anyhow::{Context, Result};
use chrono::Local;
use std::io::Write;
use std::sync::Arc;

use super::SnapshotSink;
use crate::models::{MeasurementSnapshot, RgbColor};

/// Writes one block per snapshot:
///
/// ```text
/// Time: 14:02:11
/// Raw: 50, 60, 40, 150
/// Clamped: 212, 255, 170
/// Scaled: #556644
/// Nearest Color: DarkOliveGreen
/// LRV: 37.6%
/// ---
/// ```
#[derive(Debug)]
pub struct ConsoleSink<W: Write + Send> {
    out: W,
}

impl ConsoleSink<std::io::Stdout> {
    /// Reports to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    /// Reports to `out`.
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    /// Gives back the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Formats one report block, without the trailing newline.
#[must_use]
pub fn format_report(snapshot: &MeasurementSnapshot) -> String {
    let raw = snapshot.raw();
    let clamped = RgbColor::clamped_from_raw(raw);
    let time = snapshot.timestamp().with_timezone(&Local).format("%H:%M:%S");

    format!(
        "Time: {time}\n\
         Raw: {}, {}, {}, {}\n\
         Clamped: {}, {}, {}\n\
         Scaled: {}\n\
         Nearest Color: {}\n\
         LRV: {:.1}%\n\
         ---",
        raw.r,
        raw.g,
        raw.b,
        raw.c,
        clamped.r,
        clamped.g,
        clamped.b,
        snapshot.color_hex(),
        snapshot.display_name(),
        snapshot.lrv(),
    )
}

impl<W: Write + Send> SnapshotSink for ConsoleSink<W> {
    fn name(&self) -> &'static str {
        "console"
    }

    fn accepts(&mut self, snapshot: &Arc<MeasurementSnapshot>) -> Result<()> {
        writeln!(self.out, "{}", format_report(snapshot)).context("Failed to write report")?;
        self.out.flush().context("Failed to flush report")
    }
}
