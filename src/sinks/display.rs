//! Small monochrome text display.
//!
//! A frame is three short text lines plus one bar per color channel:
//!
//! ```text
//! #556644
//! DarkOliveGreen
//! LRV: 37.6%
//! R: [===       ]
//! G: [====      ]
//! B: [==        ]
//! ```

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use anyhow::{Context, Result};
use std::io::Write;
use std::sync::Arc;

use super::SnapshotSink;
use crate::constants::DISPLAY_NAME_WIDTH;
use crate::models::MeasurementSnapshot;

/// One horizontal bar: label and a 0-255 value.
pub type Bar = (String, u8);

/// Port for a 1-bit text display.
pub trait DisplayPanel: Send {
    /// Replaces the screen contents.
    fn render(&mut self, lines: &[String], bars: &[Bar]) -> Result<()>;
}

/// Draws a `[====      ]` bar with `value` (0-255) mapped onto `width` cells.
#[must_use]
pub fn bar(value: u8, width: usize) -> String {
    let filled = ((f64::from(value) / 255.0) * width as f64) as usize;
    let filled = filled.min(width);
    format!("[{}{}]", "=".repeat(filled), " ".repeat(width - filled))
}

/// Truncates a color name to what fits on one display line.
#[must_use]
pub fn fit_name(name: &str) -> String {
    name.chars().take(DISPLAY_NAME_WIDTH).collect()
}

/// Text panel writing frames to any writer, e.g. a terminal pane or a
/// character LCD bridge.
#[derive(Debug)]
pub struct TextPanel<W: Write + Send> {
    out: W,
    bar_width: usize,
}

impl<W: Write + Send> TextPanel<W> {
    /// Creates a panel with bars `bar_width` cells wide.
    pub const fn new(out: W, bar_width: usize) -> Self {
        Self { out, bar_width }
    }

    /// Gives back the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> DisplayPanel for TextPanel<W> {
    fn render(&mut self, lines: &[String], bars: &[Bar]) -> Result<()> {
        for line in lines {
            writeln!(self.out, "{line}").context("Failed to draw display line")?;
        }
        for (label, value) in bars {
            writeln!(self.out, "{label}: {}", bar(*value, self.bar_width))
                .context("Failed to draw display bar")?;
        }
        self.out.flush().context("Failed to flush display")
    }
}

/// Renders each snapshot to a [`DisplayPanel`].
#[derive(Debug)]
pub struct DisplaySink<P: DisplayPanel> {
    panel: P,
}

impl<P: DisplayPanel> DisplaySink<P> {
    /// Drives `panel`.
    pub const fn new(panel: P) -> Self {
        Self { panel }
    }

    /// Gives back the panel.
    pub fn into_inner(self) -> P {
        self.panel
    }
}

/// Text lines and bars for one snapshot.
#[must_use]
pub fn frame(snapshot: &MeasurementSnapshot) -> (Vec<String>, Vec<Bar>) {
    let scaled = snapshot.scaled();
    let lines = vec![
        snapshot.color_hex(),
        fit_name(snapshot.display_name()),
        format!("LRV: {:.1}%", snapshot.lrv()),
    ];
    let bars = vec![
        ("R".to_string(), scaled.r),
        ("G".to_string(), scaled.g),
        ("B".to_string(), scaled.b),
    ];
    (lines, bars)
}

impl<P: DisplayPanel> SnapshotSink for DisplaySink<P> {
    fn name(&self) -> &'static str {
        "display"
    }

    fn accepts(&mut self, snapshot: &Arc<MeasurementSnapshot>) -> Result<()> {
        let (lines, bars) = frame(snapshot);
        self.panel.render(&lines, &bars)
    }
}
