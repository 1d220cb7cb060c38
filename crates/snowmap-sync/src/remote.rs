//! Remote source of segments and contributions

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use snowmap_types::{Contribution, Segment, Timestamp, UpdateBatch};
use tracing::{debug, warn};

/// Anything that can answer "what changed since `from`".
///
/// `from = None` asks for the full dataset.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    async fn fetch_since(&self, from: Option<Timestamp>) -> SyncResult<UpdateBatch>;
}

/// Body of `GET /update`. Entities stay raw until decoded one by one, so a
/// single malformed entry cannot fail the whole batch.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateResponse {
    #[serde(default)]
    contributions: Vec<serde_json::Value>,

    #[serde(default)]
    troncons: Vec<serde_json::Value>,

    /// Server-side cursor; older servers echo it as `date` or not at all
    #[serde(default, alias = "date")]
    as_of: Option<Timestamp>,
}

/// HTTP client for the `/update` endpoint
pub struct HttpRemoteSource {
    client: Client,
    base_url: String,
}

impl HttpRemoteSource {
    pub fn new(endpoint: &str, timeout: std::time::Duration) -> SyncResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl RemoteSource for HttpRemoteSource {
    async fn fetch_since(&self, from: Option<Timestamp>) -> SyncResult<UpdateBatch> {
        let url = format!("{}/update", self.base_url);
        let mut request = self.client.get(&url);
        if let Some(from) = from {
            request = request.query(&[("from", from.to_rfc3339_opts(SecondsFormat::Millis, true))]);
        }

        // Captured before sending so a missing server cursor can only cause
        // an overlapping fetch next time, never a gap.
        let requested_at = chrono::Utc::now();
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SyncError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        let update: UpdateResponse = serde_json::from_slice(&body)?;

        let segments: Vec<Segment> = decode_entities("segment", update.troncons);
        let contributions: Vec<Contribution> =
            decode_entities("contribution", update.contributions);

        debug!(
            segments = segments.len(),
            contributions = contributions.len(),
            server_cursor = update.as_of.is_some(),
            "Fetched update"
        );

        Ok(UpdateBatch {
            segments,
            contributions,
            as_of: update.as_of.unwrap_or(requested_at),
        })
    }
}

/// Decode each entry on its own, dropping the ones that do not parse.
fn decode_entities<T: DeserializeOwned>(kind: &'static str, items: Vec<serde_json::Value>) -> Vec<T> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(entity) => Some(entity),
            Err(e) => {
                warn!(kind, error = %e, "Dropping malformed entity");
                None
            }
        })
        .collect()
}
