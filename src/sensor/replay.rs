//! Replays recorded RGBC samples.
//!
//! Recording format is one sample per line, `r,g,b,c`. Blank lines and lines
//! starting with `#` are ignored.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use super::{Sensor, SensorError};
use crate::models::RawChannels;

/// Shared view of a [`ReplaySensor`]'s LED state and switch history.
#[derive(Debug, Clone, Default)]
pub struct IlluminationProbe {
    on: Arc<AtomicBool>,
    switch_offs: Arc<AtomicUsize>,
}

impl IlluminationProbe {
    /// Whether the LEDs are currently on.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.on.load(Ordering::SeqCst)
    }

    /// How many times the LEDs were switched off.
    #[must_use]
    pub fn switch_off_count(&self) -> usize {
        self.switch_offs.load(Ordering::SeqCst)
    }

    fn record(&self, on: bool) {
        self.on.store(on, Ordering::SeqCst);
        if !on {
            self.switch_offs.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Sensor that returns recorded samples in order.
#[derive(Debug, Clone)]
pub struct ReplaySensor {
    samples: Vec<RawChannels>,
    position: usize,
    reads: usize,
    repeat: bool,
    probe: IlluminationProbe,
}

impl ReplaySensor {
    /// Creates a sensor replaying `samples`.
    ///
    /// With `repeat`, playback wraps around; otherwise reading past the end
    /// fails with [`SensorError::Exhausted`].
    #[must_use]
    pub fn new(samples: Vec<RawChannels>, repeat: bool) -> Self {
        Self {
            samples,
            position: 0,
            reads: 0,
            repeat,
            probe: IlluminationProbe::default(),
        }
    }

    /// Loads a recording from disk.
    pub fn from_file(path: &Path, repeat: bool) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read replay file: {}", path.display()))?;
        let samples = parse_recording(&content)
            .context(format!("Failed to parse replay file: {}", path.display()))?;
        if samples.is_empty() {
            anyhow::bail!("Replay file {} contains no samples", path.display());
        }
        Ok(Self::new(samples, repeat))
    }

    /// Handle for observing illumination from outside.
    #[must_use]
    pub fn illumination_probe(&self) -> IlluminationProbe {
        self.probe.clone()
    }

    /// Number of raw reads served so far.
    #[must_use]
    pub const fn reads(&self) -> usize {
        self.reads
    }
}

impl Sensor for ReplaySensor {
    fn read_raw_channels(&mut self) -> Result<RawChannels, SensorError> {
        if self.position >= self.samples.len() {
            if !self.repeat || self.samples.is_empty() {
                return Err(SensorError::Exhausted(self.reads));
            }
            self.position = 0;
        }

        let sample = self.samples[self.position];
        self.position += 1;
        self.reads += 1;
        Ok(sample)
    }

    fn set_illumination(&mut self, on: bool) -> Result<(), SensorError> {
        self.probe.record(on);
        Ok(())
    }
}

/// Parses `r,g,b,c` lines.
pub fn parse_recording(content: &str) -> Result<Vec<RawChannels>> {
    content
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line_number, line)| {
            let values = line
                .split(',')
                .map(|field| field.trim().parse::<u16>())
                .collect::<std::result::Result<Vec<_>, _>>()
                .context(format!("Line {line_number}: invalid channel count in '{line}'"))?;
            match values.as_slice() {
                [r, g, b, c] => Ok(RawChannels::new(*r, *g, *b, *c)),
                _ => anyhow::bail!(
                    "Line {line_number}: expected 4 values (r,g,b,c), got {}",
                    values.len()
                ),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recording() {
        let samples = parse_recording("# r,g,b,c\n50,60,40,150\n\n 1, 2, 3, 4 \n").unwrap();
        assert_eq!(
            samples,
            vec![RawChannels::new(50, 60, 40, 150), RawChannels::new(1, 2, 3, 4)]
        );
    }

    #[test]
    fn test_parse_recording_errors() {
        assert!(parse_recording("1,2,3").is_err());
        assert!(parse_recording("1,2,3,x").is_err());
        assert!(parse_recording("1,2,3,70000").is_err());
        let err = parse_recording("1,2,3,4\n5,6\n").unwrap_err();
        assert!(err.to_string().contains("Line 2"));
    }

    #[test]
    fn test_replay_without_repeat_exhausts() {
        let mut sensor = ReplaySensor::new(vec![RawChannels::new(1, 1, 1, 1)], false);
        assert!(sensor.read_raw_channels().is_ok());
        assert!(matches!(
            sensor.read_raw_channels(),
            Err(SensorError::Exhausted(1))
        ));
    }

    #[test]
    fn test_replay_with_repeat_wraps() {
        let a = RawChannels::new(1, 0, 0, 1);
        let b = RawChannels::new(0, 1, 0, 1);
        let mut sensor = ReplaySensor::new(vec![a, b], true);
        let read: Vec<_> = (0..5).map(|_| sensor.read_raw_channels().unwrap()).collect();
        assert_eq!(read, vec![a, b, a, b, a]);
        assert_eq!(sensor.reads(), 5);
    }

    #[test]
    fn test_read_scaled_uses_next_sample() {
        let mut sensor = ReplaySensor::new(
            vec![RawChannels::new(50, 60, 40, 150), RawChannels::new(0, 0, 0, 0)],
            false,
        );
        let scaled = sensor.read_scaled().unwrap();
        assert_eq!(scaled.to_hex(), "#556644");
        assert_eq!(sensor.read_scaled().unwrap().to_hex(), "#000000");
    }

    #[test]
    fn test_illumination_probe() {
        let mut sensor = ReplaySensor::new(Vec::new(), false);
        let probe = sensor.illumination_probe();
        sensor.set_illumination(true).unwrap();
        assert!(probe.is_on());
        sensor.set_illumination(false).unwrap();
        assert!(!probe.is_on());
        assert_eq!(probe.switch_off_count(), 1);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("samples.csv");
        fs::write(&path, "10,20,30,40\n").unwrap();
        let mut sensor = ReplaySensor::from_file(&path, false).unwrap();
        assert_eq!(
            sensor.read_raw_channels().unwrap(),
            RawChannels::new(10, 20, 30, 40)
        );

        fs::write(&path, "# nothing\n").unwrap();
        assert!(ReplaySensor::from_file(&path, false).is_err());
    }
}
