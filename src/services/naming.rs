//! Optional remote color naming.
//!
//! When a naming service is configured its answer replaces the palette name.
//! Any failure (unreachable host, timeout, bad status, unexpected body)
//! yields no name, which is shown as "Unknown".

use async_trait::async_trait;

use crate::models::MeasurementSnapshot;

#[cfg(feature = "remote-names")]
pub use http::HttpNameLookup;

/// Looks up a human-readable name for a color.
#[async_trait]
pub trait NameLookup: Send + Sync {
    /// Name for `hex` (lowercase `#rrggbb`), or `None` when unavailable.
    async fn lookup_name(&self, hex: &str) -> Option<String>;
}

/// Replaces the snapshot's name with the lookup result.
pub async fn apply_lookup(
    snapshot: MeasurementSnapshot,
    lookup: &dyn NameLookup,
) -> MeasurementSnapshot {
    let name = lookup.lookup_name(&snapshot.color_hex()).await;
    snapshot.with_color_name(name)
}

/// Pulls a non-empty string out of a JSON response.
#[must_use]
pub fn extract_name(value: &serde_json::Value, json_pointer: &str) -> Option<String> {
    value
        .pointer(json_pointer)
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
}

/// Fills a URL template's `{hex}` placeholder with the six hex digits.
#[must_use]
pub fn request_url(template: &str, hex: &str) -> String {
    template.replace("{hex}", hex.trim_start_matches('#'))
}

#[cfg(feature = "remote-names")]
mod http {
    use anyhow::{Context, Result};
    use async_trait::async_trait;
    use std::time::Duration;
    use tracing::debug;

    use super::{extract_name, request_url, NameLookup};
    use crate::config::NamingConfig;

    /// Naming service reached over HTTP GET.
    #[derive(Debug, Clone)]
    pub struct HttpNameLookup {
        client: reqwest::Client,
        url_template: String,
        json_pointer: String,
    }

    impl HttpNameLookup {
        /// Creates a lookup against `url_template` (containing `{hex}`).
        pub fn new(
            url_template: impl Into<String>,
            json_pointer: impl Into<String>,
            timeout: Duration,
        ) -> Result<Self> {
            let client = reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .context("Failed to build HTTP client for color naming")?;
            Ok(Self {
                client,
                url_template: url_template.into(),
                json_pointer: json_pointer.into(),
            })
        }

        /// Builds a lookup from the `[naming]` section, if one is configured.
        pub fn from_config(config: &NamingConfig) -> Result<Option<Self>> {
            config
                .remote_url
                .as_ref()
                .map(|url| {
                    Self::new(
                        url.clone(),
                        config.json_pointer.clone(),
                        Duration::from_millis(config.timeout_ms),
                    )
                })
                .transpose()
        }

        async fn fetch(&self, hex: &str) -> Result<Option<String>> {
            let url = request_url(&self.url_template, hex);
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .context(format!("Request to {url} failed"))?
                .error_for_status()
                .context(format!("Naming service rejected {url}"))?;
            let body: serde_json::Value = response
                .json()
                .await
                .context("Naming service returned invalid JSON")?;
            Ok(extract_name(&body, &self.json_pointer))
        }
    }

    #[async_trait]
    impl NameLookup for HttpNameLookup {
        async fn lookup_name(&self, hex: &str) -> Option<String> {
            match self.fetch(hex).await {
                Ok(name) => name,
                Err(e) => {
                    debug!("Color name lookup for {} failed: {:#}", hex, e);
                    None
                }
            }
        }
    }
}
