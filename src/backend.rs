//! HTTP client for the upstream smart-meter backend.
//!
//! Both endpoints answer a JSON array. Items are decoded one by one so a single
//! malformed row is logged and skipped instead of failing the whole fetch.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;
use crate::models::{ChartRequest, Parameter, Phase, Reading, UsageInterval};

// ---

const READINGS_PATH: &str = "/api/smart-meter/readings";
const USAGE_PATH: &str = "/api/all-power-source-usage";

/// Request body for the readings endpoint.
#[derive(Debug, Serialize)]
struct ReadingsQuery<'a> {
    device_id: &'a str,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    phase: &'a [Phase],
    param: &'a [Parameter],
}

#[derive(Debug, Serialize)]
struct UsageQuery<'a> {
    device_id: &'a str,
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        // ---
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the readings of one device over the requested range.
    pub async fn fetch_readings(&self, request: &ChartRequest) -> Result<Vec<Reading>> {
        // ---
        let body = ReadingsQuery {
            device_id: &request.device_id,
            start_date: request.start_date,
            end_date: request.end_date,
            phase: request.selection.phases(),
            param: request.selection.parameters(),
        };
        let items = self.post_for_items(READINGS_PATH, &body).await?;
        Ok(decode_items(items, "reading"))
    }

    /// Fetch every usage interval recorded for a device.
    ///
    /// An empty or `null` response yields an empty vector.
    pub async fn fetch_usage(&self, device_id: &str) -> Result<Vec<UsageInterval>> {
        // ---
        let items = self
            .post_for_items(USAGE_PATH, &UsageQuery { device_id })
            .await?;
        Ok(decode_items(items, "usage interval"))
    }

    async fn post_for_items<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Vec<serde_json::Value>> {
        // ---
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("POST {}", url);

        let bytes = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            tracing::debug!("{} returned an empty body", path);
            return Ok(Vec::new());
        }

        match serde_json::from_slice::<serde_json::Value>(&bytes)? {
            serde_json::Value::Array(items) => {
                tracing::debug!("{} returned {} items", path, items.len());
                Ok(items)
            }
            serde_json::Value::Null => {
                tracing::debug!("{} returned no data", path);
                Ok(Vec::new())
            }
            other => {
                tracing::warn!("{} returned a non-array body: {}", path, other);
                Ok(Vec::new())
            }
        }
    }
}

fn decode_items<T: DeserializeOwned>(items: Vec<serde_json::Value>, kind: &str) -> Vec<T> {
    // ---
    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value::<T>(item.clone()) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!("Failed to parse {} {}: {} - Raw item: {}", kind, i, e, item);
                None
            }
        })
        .collect();

    if decoded.len() < total {
        tracing::warn!(
            "Skipped {} of {} malformed {} rows",
            total - decoded.len(),
            total,
            kind
        );
    }
    decoded
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_items_skips_malformed_rows() {
        // ---
        let items = vec![
            json!({"timestamp": "2024-05-01T10:00:00Z", "avg_current": 1.0}),
            json!({"avg_current": 2.0}),
            json!({"timestamp": "2024-05-01T10:01:00Z", "avg_current": 3.0}),
        ];
        let readings: Vec<Reading> = decode_items(items, "reading");

        assert_eq!(readings.len(), 2);
        assert_eq!(readings[1].avg_current, Some(3.0));
    }

    #[test]
    fn test_readings_query_wire_shape() {
        // ---
        let body = ReadingsQuery {
            device_id: "meter-7",
            start_date: "2024-05-01T00:00:00Z".parse().unwrap(),
            end_date: "2024-05-02T00:00:00Z".parse().unwrap(),
            phase: &[Phase::Phase1, Phase::Others],
            param: &[Parameter::Kw],
        };
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["device_id"], "meter-7");
        assert_eq!(json["start_date"], "2024-05-01T00:00:00Z");
        assert_eq!(json["phase"], json!(["phase1", "others"]));
        assert_eq!(json["param"], json!(["kw"]));
    }
}
