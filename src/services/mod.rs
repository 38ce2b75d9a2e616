//! Service layer for the measurement pipeline.
//!
//! Pure computations (normalization, classification, LRV) plus the
//! calibration state machine, its persistence and the optional remote
//! naming client.

pub mod calibration;
pub mod calibration_store;
pub mod classifier;
pub mod lrv;
pub mod naming;
pub mod normalizer;
pub mod pipeline;

// Re-export commonly used types and functions
pub use calibration::{CalibrationEngine, CalibrationPhase, SampleOutcome};
pub use calibration_store::CalibrationStore;
pub use classifier::{classify, nearest, Classification};
pub use naming::NameLookup;
#[cfg(feature = "remote-names")]
pub use naming::HttpNameLookup;
pub use normalizer::{normalize, ChannelNormalizer};
pub use pipeline::MeasurementPipeline;
