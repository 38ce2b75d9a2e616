//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving application configuration
//! in TOML format with platform-specific directory resolution.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::constants::{
    CONFIG_DIR_ENV, CONFIG_DIR_NAME, DEFAULT_SCALING_FACTOR, READINGS_PER_SAMPLE,
};
use crate::models::{CalibrationSample, ColorPalette, RgbColor, SensitivityProfile};
use crate::services::ChannelNormalizer;

/// Shortest allowed sampling interval.
pub const MIN_SAMPLE_INTERVAL_MS: u64 = 500;
/// Longest allowed sampling interval.
pub const MAX_SAMPLE_INTERVAL_MS: u64 = 1000;

/// Which sensor adapter feeds the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SensorBackend {
    /// Synthetic readings of a configured surface color
    #[default]
    Simulated,
    /// Recorded samples read from a file
    Replay,
}

/// Sensor and sampling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Sensor adapter to use
    pub backend: SensorBackend,
    /// Delay between sampling cycles in milliseconds (500-1000)
    pub sample_interval_ms: u64,
    /// Delay after switching the LEDs on before the first reading
    pub warmup_ms: u64,
    /// Apply the BH1745 sensitivity correction when normalizing channels
    pub sensitivity_correction: bool,
    /// Surface color seen by the simulated sensor
    pub simulated_surface: String,
    /// Recorded samples for the replay sensor (one `r,g,b,c` per line)
    pub replay_file: Option<PathBuf>,
    /// Start over when the replay file is exhausted
    pub replay_repeat: bool,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            backend: SensorBackend::default(),
            sample_interval_ms: 1000,
            warmup_ms: 1000,
            sensitivity_correction: false,
            simulated_surface: "#C8B496".to_string(),
            replay_file: None,
            replay_repeat: true,
        }
    }
}

impl SensorConfig {
    /// Sampling interval as a duration.
    #[must_use]
    pub const fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    /// LED warm-up delay as a duration.
    #[must_use]
    pub const fn warmup(&self) -> Duration {
        Duration::from_millis(self.warmup_ms)
    }

    /// Normalization policy for this deployment.
    #[must_use]
    pub const fn normalizer(&self) -> ChannelNormalizer {
        if self.sensitivity_correction {
            ChannelNormalizer::corrected(SensitivityProfile::BH1745)
        } else {
            ChannelNormalizer::uncorrected()
        }
    }
}

/// Calibration procedure settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Where the scaling factor is persisted (defaults to `calibration.json`
    /// in the config directory)
    pub file: Option<PathBuf>,
    /// Raw readings averaged per reference
    pub readings_per_sample: usize,
    /// Factor used when calibration yields nothing
    pub default_scaling_factor: f64,
    /// Ordered reference cards
    pub references: Vec<CalibrationSample>,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            file: None,
            readings_per_sample: READINGS_PER_SAMPLE,
            default_scaling_factor: DEFAULT_SCALING_FACTOR,
            references: CalibrationSample::default_references(),
        }
    }
}

/// Palette settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PaletteConfig {
    /// JSON palette replacing the built-in HTML colors
    pub file: Option<PathBuf>,
}

impl PaletteConfig {
    /// Loads the configured palette, or the built-in one.
    pub fn load(&self) -> Result<ColorPalette> {
        match &self.file {
            Some(path) => ColorPalette::from_file(path),
            None => ColorPalette::load(),
        }
    }
}

/// Network status page settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Serve the status page
    pub enabled: bool,
    /// Address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl WebConfig {
    /// Socket address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .context(format!("Invalid web host address: {}", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Remote color naming settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// URL template with a `{hex}` placeholder (six hex digits, no `#`).
    /// When unset, names come from the palette.
    pub remote_url: Option<String>,
    /// JSON pointer to the name inside the response body
    pub json_pointer: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            remote_url: None,
            json_pointer: "/name/value".to_string(),
            timeout_ms: 800,
        }
    }
}

/// Local display settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Render the text display frame each cycle
    pub enabled: bool,
    /// Bar graph width in cells
    pub bar_width: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bar_width: 10,
        }
    }
}

/// Application configuration.
///
/// # File Location
///
/// - `$LRV_METER_CONFIG_DIR/config.toml` when the variable is set
/// - Linux: `~/.config/LrvMeter/config.toml`
/// - macOS: `~/Library/Application Support/LrvMeter/config.toml`
/// - Windows: `%APPDATA%\LrvMeter\config.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Sensor and sampling
    pub sensor: SensorConfig,
    /// Calibration procedure
    pub calibration: CalibrationConfig,
    /// Color palette
    pub palette: PaletteConfig,
    /// Status page
    pub web: WebConfig,
    /// Remote color naming
    pub naming: NamingConfig,
    /// Local display
    pub display: DisplayConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the config directory path.
    ///
    /// `LRV_METER_CONFIG_DIR` wins over the platform directory.
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(CONFIG_DIR_NAME);

        Ok(config_dir)
    }

    /// Path of the config file inside `dir`.
    #[must_use]
    pub fn config_file_path(dir: &Path) -> PathBuf {
        dir.join("config.toml")
    }

    /// Path of the calibration file, relative to `dir` unless configured.
    #[must_use]
    pub fn calibration_file_path(&self, dir: &Path) -> PathBuf {
        self.calibration
            .file
            .clone()
            .unwrap_or_else(|| dir.join("calibration.json"))
    }

    /// Loads configuration from `dir`.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load_from(dir: &Path) -> Result<Self> {
        let config_path = Self::config_file_path(dir);

        if !config_path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(&config_path).context(format!(
            "Failed to read config file: {}",
            config_path.display()
        ))?;

        let config: Self = toml::from_str(&content).context(format!(
            "Failed to parse config file: {}",
            config_path.display()
        ))?;

        config.validate().context(format!(
            "Invalid configuration in {}",
            config_path.display()
        ))?;

        Ok(config)
    }

    /// Loads configuration from `dir`, writing the defaults there on first run.
    ///
    /// Failing to write the defaults is not fatal; the defaults are used anyway.
    pub fn load_or_init(dir: &Path) -> Result<Self> {
        if Self::config_file_path(dir).exists() {
            return Self::load_from(dir);
        }

        let config = Self::new();
        match config.save_to(dir) {
            Ok(()) => info!("Wrote default configuration to {}", dir.display()),
            Err(e) => warn!("Could not write default configuration: {:#}", e),
        }
        Ok(config)
    }

    /// Saves configuration to `dir` using atomic write.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save_to(&self, dir: &Path) -> Result<()> {
        self.validate()?;

        fs::create_dir_all(dir).context(format!(
            "Failed to create config directory: {}",
            dir.display()
        ))?;

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        let config_path = Self::config_file_path(dir);
        let temp_path = config_path.with_extension("toml.tmp");

        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        fs::rename(&temp_path, &config_path).context(format!(
            "Failed to rename temp config file to: {}",
            config_path.display()
        ))?;

        Ok(())
    }

    /// Validates configuration values.
    ///
    /// Checks:
    /// - sampling interval is within 500-1000 ms
    /// - simulated surface is a valid hex color
    /// - replay backend has a replay file
    /// - at least one reading per calibration reference, positive default factor
    /// - reference reflectances are within 0-100
    /// - bar width is non-zero
    /// - a configured palette file loads with at least one entry
    pub fn validate(&self) -> Result<()> {
        let interval = self.sensor.sample_interval_ms;
        if !(MIN_SAMPLE_INTERVAL_MS..=MAX_SAMPLE_INTERVAL_MS).contains(&interval) {
            anyhow::bail!(
                "sensor.sample_interval_ms must be between {MIN_SAMPLE_INTERVAL_MS} and {MAX_SAMPLE_INTERVAL_MS}, got {interval}"
            );
        }

        RgbColor::from_hex(&self.sensor.simulated_surface)
            .context("sensor.simulated_surface is not a valid color")?;

        if self.sensor.backend == SensorBackend::Replay && self.sensor.replay_file.is_none() {
            anyhow::bail!("sensor.replay_file is required for the replay backend");
        }

        if self.calibration.readings_per_sample == 0 {
            anyhow::bail!("calibration.readings_per_sample must be at least 1");
        }

        let default_factor = self.calibration.default_scaling_factor;
        if !default_factor.is_finite() || default_factor <= 0.0 {
            anyhow::bail!(
                "calibration.default_scaling_factor must be positive, got {default_factor}"
            );
        }

        for reference in &self.calibration.references {
            if !(0.0..=100.0).contains(&reference.known_reflectance_pct) {
                anyhow::bail!(
                    "Reference '{}' has reflectance {} outside 0-100",
                    reference.label,
                    reference.known_reflectance_pct
                );
            }
        }

        if self.display.bar_width == 0 {
            anyhow::bail!("display.bar_width must be at least 1");
        }

        if let Some(url) = &self.naming.remote_url {
            if !url.contains("{hex}") {
                anyhow::bail!("naming.remote_url must contain a {{hex}} placeholder");
            }
        }

        if self.palette.file.is_some() {
            self.palette
                .load()
                .context("palette.file is not a usable palette")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_new() {
        let config = Config::new();
        assert_eq!(config.sensor.backend, SensorBackend::Simulated);
        assert_eq!(config.sensor.sample_interval_ms, 1000);
        assert!(!config.sensor.sensitivity_correction);
        assert_eq!(config.calibration.readings_per_sample, 5);
        assert!((config.calibration.default_scaling_factor - 100.0).abs() < f64::EPSILON);
        assert_eq!(config.calibration.references.len(), 3);
        assert!(config.web.enabled);
        assert_eq!(config.web.port, 8080);
        assert!(config.naming.remote_url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_interval_bounds() {
        let mut config = Config::new();
        config.sensor.sample_interval_ms = 499;
        assert!(config.validate().is_err());
        config.sensor.sample_interval_ms = 500;
        assert!(config.validate().is_ok());
        config.sensor.sample_interval_ms = 1001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::new();
        config.calibration.references[1].known_reflectance_pct = 120.0;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.calibration.readings_per_sample = 0;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.sensor.simulated_surface = "beige".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.sensor.backend = SensorBackend::Replay;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.naming.remote_url = Some("https://example.com/name".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();

        let mut config = Config::new();
        config.sensor.sample_interval_ms = 750;
        config.sensor.sensitivity_correction = true;
        config.web.port = 9090;
        config.calibration.references = vec![CalibrationSample::new("Paper", 88.0)];

        config.save_to(temp_dir.path()).unwrap();
        assert!(!temp_dir.path().join("config.toml.tmp").exists());

        let loaded = Config::load_from(temp_dir.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(Config::load_from(temp_dir.path()).unwrap(), Config::new());
    }

    #[test]
    fn test_partial_file_uses_section_defaults() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("config.toml"),
            "[web]\nport = 3000\n\n[sensor]\nsample_interval_ms = 500\n",
        )
        .unwrap();

        let config = Config::load_from(temp_dir.path()).unwrap();
        assert_eq!(config.web.port, 3000);
        assert_eq!(config.web.host, "0.0.0.0");
        assert_eq!(config.sensor.sample_interval_ms, 500);
        assert_eq!(config.sensor.warmup_ms, 1000);
    }

    #[test]
    fn test_load_invalid_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("config.toml"), "[sensor\n").unwrap();
        assert!(Config::load_from(temp_dir.path()).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_palette_file() {
        let temp_dir = TempDir::new().unwrap();
        let palette = temp_dir.path().join("colors.json");
        fs::write(&palette, r#"{"colors": []}"#).unwrap();

        let mut config = Config::new();
        config.palette.file = Some(palette.clone());
        let err = config.validate().unwrap_err();
        assert!(format!("{err:#}").contains("palette.file"));

        fs::write(&palette, r##"{"colors": [{"name": "Olive", "hex": "#808000"}]}"##).unwrap();
        assert!(config.validate().is_ok());

        config.palette.file = Some(temp_dir.path().join("missing.json"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_init_writes_defaults_once() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("fresh");

        let config = Config::load_or_init(&dir).unwrap();
        assert_eq!(config, Config::new());
        assert!(Config::config_file_path(&dir).exists());
        assert_eq!(Config::load_from(&dir).unwrap(), Config::new());

        fs::write(Config::config_file_path(&dir), "[web]\nport = 3000\n").unwrap();
        assert_eq!(Config::load_or_init(&dir).unwrap().web.port, 3000);
    }

    #[test]
    fn test_calibration_file_path() {
        let dir = Path::new("/tmp/lrv");
        let mut config = Config::new();
        assert_eq!(
            config.calibration_file_path(dir),
            PathBuf::from("/tmp/lrv/calibration.json")
        );
        config.calibration.file = Some(PathBuf::from("/var/lib/lrv/cal.json"));
        assert_eq!(
            config.calibration_file_path(dir),
            PathBuf::from("/var/lib/lrv/cal.json")
        );
    }

    #[test]
    fn test_normalizer_policy() {
        let mut config = Config::new();
        assert!(config.sensor.normalizer().profile().is_none());
        config.sensor.sensitivity_correction = true;
        assert!(config.sensor.normalizer().profile().is_some());
    }

    #[test]
    fn test_socket_addr() {
        let config = Config::new();
        assert_eq!(
            config.web.socket_addr().unwrap(),
            "0.0.0.0:8080".parse().unwrap()
        );

        let mut config = Config::new();
        config.web.host = "not-an-ip".to_string();
        assert!(config.web.socket_addr().is_err());
    }
}
