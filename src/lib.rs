//! LRV Meter Library
//!
//! Reads an RGBC color sensor, calibrates it against reference cards, and
//! turns each reading into a named color and a Light Reflectance Value that
//! is printed, drawn on a panel and served on a small status page.

// Module declarations
pub mod app;
pub mod config;
pub mod constants;
pub mod models;
pub mod sensor;
pub mod services;
pub mod sinks;
#[cfg(feature = "web")]
pub mod web;
