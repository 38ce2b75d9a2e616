//! Status page server.
//!
//! Serves the most recent measurement read-only to any poller. The server only
//! reads the latest-snapshot slot and never blocks the sampling loop.
//!
//! # Endpoints
//!
//! - `GET /` - Status page (polls `/data` every second)
//! - `GET /data` - Latest reading as JSON
//! - `GET /health` - Health check

pub mod static_files;

use std::net::SocketAddr;

use anyhow::Context;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::constants::{APP_NAME, UNKNOWN_COLOR_NAME};
use crate::models::{MeasurementSnapshot, RawChannels, RgbColor};
use crate::sinks::SnapshotReader;

// ============================================================================
// Application State
// ============================================================================

/// Shared state for the status server.
#[derive(Clone)]
pub struct AppState {
    /// Read handle on the latest snapshot
    latest: SnapshotReader,
}

impl AppState {
    /// Creates state reading from `latest`.
    #[must_use]
    pub const fn new(latest: SnapshotReader) -> Self {
        Self { latest }
    }
}

// ============================================================================
// Response Types
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Current health status (e.g., "healthy").
    pub status: String,
    /// Application version.
    pub version: String,
    /// Whether at least one reading has been published.
    pub has_reading: bool,
}

/// 8-bit color channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RgbPayload {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
}

impl From<&RgbColor> for RgbPayload {
    fn from(color: &RgbColor) -> Self {
        Self {
            r: color.r,
            g: color.g,
            b: color.b,
        }
    }
}

/// Raw sensor counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RawPayload {
    /// Red count
    pub r: u16,
    /// Green count
    pub g: u16,
    /// Blue count
    pub b: u16,
    /// Clear count
    pub c: u16,
}

impl From<&RawChannels> for RawPayload {
    fn from(raw: &RawChannels) -> Self {
        Self {
            r: raw.r,
            g: raw.g,
            b: raw.b,
            c: raw.c,
        }
    }
}

/// Latest reading as served by `GET /data`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataResponse {
    /// Lowercase `#rrggbb`
    pub color_hex: String,
    /// Color name, "Unknown" when none
    pub color_name: String,
    /// Light Reflectance Value, 0-100
    pub lrv: f64,
    /// Scaled 8-bit color
    pub rgb: RgbPayload,
    /// Raw counts
    pub raw: RawPayload,
    /// Capture time (RFC 3339), absent before the first reading
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl DataResponse {
    /// Payload served before the first reading: black, "Unknown", zeros.
    #[must_use]
    pub fn initial() -> Self {
        Self {
            color_hex: RgbColor::default().to_hex(),
            color_name: UNKNOWN_COLOR_NAME.to_string(),
            lrv: 0.0,
            rgb: RgbPayload::from(&RgbColor::default()),
            raw: RawPayload::from(&RawChannels::default()),
            timestamp: None,
        }
    }
}

impl From<&MeasurementSnapshot> for DataResponse {
    fn from(snapshot: &MeasurementSnapshot) -> Self {
        Self {
            color_hex: snapshot.color_hex(),
            color_name: snapshot.display_name().to_string(),
            lrv: snapshot.lrv(),
            rgb: RgbPayload::from(snapshot.scaled()),
            raw: RawPayload::from(snapshot.raw()),
            timestamp: Some(snapshot.timestamp().to_rfc3339()),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health - Health check endpoint.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        has_reading: state.latest.latest().is_some(),
    })
}

/// GET /data - Latest reading.
async fn get_data(State(state): State<AppState>) -> Json<DataResponse> {
    let payload = state
        .latest
        .latest()
        .map_or_else(DataResponse::initial, |snapshot| {
            DataResponse::from(snapshot.as_ref())
        });
    Json(payload)
}

// ============================================================================
// Router
// ============================================================================

/// Creates the status router.
pub fn create_router(state: AppState) -> Router {
    // The page may be polled from other devices on the LAN
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(static_files::serve_index))
        .route("/data", get(get_data))
        .route("/health", get(health_check))
        .fallback(static_files::serve_static)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Runs the status server until `cancel` fires.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn run_server(
    latest: SnapshotReader,
    addr: SocketAddr,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let app = create_router(AppState::new(latest));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind status page to {addr}"))?;
    info!("Starting {} status page on http://{}", APP_NAME, addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .context("Status page server failed")?;

    info!("Status page stopped");
    Ok(())
}
