//! Named reference colors used for nearest-color classification.
//!
//! The built-in palette is the 50 HTML color names the meter has always
//! shipped with. A deployment may replace it with its own JSON file in the
//! same format.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::RgbColor;

/// A single named reference color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteEntry {
    /// Display name of the color (e.g., "DarkKhaki").
    pub name: String,
    /// Reference color.
    pub rgb: RgbColor,
}

impl PaletteEntry {
    /// Creates a palette entry.
    pub fn new(name: impl Into<String>, rgb: RgbColor) -> Self {
        Self {
            name: name.into(),
            rgb,
        }
    }
}

/// On-disk representation of a palette file.
#[derive(Debug, Deserialize)]
struct PaletteFile {
    colors: Vec<PaletteFileEntry>,
}

#[derive(Debug, Deserialize)]
struct PaletteFileEntry {
    name: String,
    hex: String,
}

/// An ordered, non-empty table of named colors.
///
/// Entry order is significant: classification ties resolve to the entry that
/// comes first. Duplicate codes under different names are kept as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorPalette {
    entries: Vec<PaletteEntry>,
}

impl ColorPalette {
    /// Builds a palette from entries.
    ///
    /// # Errors
    /// Returns an error if `entries` is empty.
    pub fn new(entries: Vec<PaletteEntry>) -> Result<Self> {
        if entries.is_empty() {
            anyhow::bail!("Color palette must contain at least one entry");
        }
        Ok(Self { entries })
    }

    /// Load the built-in HTML color palette from embedded JSON data.
    ///
    /// # Errors
    /// Returns an error if the JSON data cannot be parsed.
    pub fn load() -> Result<Self> {
        let json_data = include_str!("../data/html_colors.json");
        Self::from_json(json_data).context("Failed to parse built-in color palette")
    }

    /// Loads a palette from a JSON file (`{"colors": [{"name", "hex"}]}`).
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read palette file: {}", path.display()))?;
        Self::from_json(&content)
            .context(format!("Failed to parse palette file: {}", path.display()))
    }

    /// Parses a palette from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: PaletteFile = serde_json::from_str(json)?;
        let entries = file
            .colors
            .into_iter()
            .map(|entry| {
                let rgb = RgbColor::from_hex(&entry.hex)
                    .context(format!("Invalid color for palette entry '{}'", entry.name))?;
                Ok(PaletteEntry::new(entry.name, rgb))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(entries)
    }

    /// Entries in classification order.
    #[must_use]
    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; a palette cannot be empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds an entry by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PaletteEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }
}
