use anyhow::Result;
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use std::collections::HashMap;

use super::DEFAULT_API_URL;
use super::types::{SubmissionPayload, VerdictEnvelope, VerdictRecord};
use crate::error::IntegrityError;

/// Seam to the remote verification service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VerdictService: Send + Sync {
    /// Submits the payload and returns verdict records keyed by package id.
    async fn submit(&self, payload: &SubmissionPayload) -> Result<HashMap<String, VerdictRecord>>;
}

/// HTTP implementation. One POST per run: no retry, no backoff, no cached
/// fallback. Failing to reach the service is fatal; an unexpected response
/// shape degrades to an empty verdict map.
pub struct HttpVerdictService {
    client: Client,
    api_url: String,
}

impl HttpVerdictService {
    pub fn new(client: Client, api_url: Option<String>) -> Self {
        let api_url = api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self { client, api_url }
    }
}

#[async_trait]
impl VerdictService for HttpVerdictService {
    #[tracing::instrument(skip(self, payload))]
    async fn submit(&self, payload: &SubmissionPayload) -> Result<HashMap<String, VerdictRecord>> {
        debug!(
            "Submitting {} package fingerprint(s) to {}",
            payload.pkg.len(),
            self.api_url
        );

        let response = self
            .client
            .post(&self.api_url)
            .json(payload)
            .send()
            .await
            .map_err(|e| IntegrityError::SubmissionFailed(e.to_string()))?;

        let response = response
            .error_for_status()
            .map_err(|e| IntegrityError::SubmissionFailed(e.to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|e| IntegrityError::SubmissionFailed(e.to_string()))?;

        Ok(parse_verdicts(&body))
    }
}

fn parse_verdicts(body: &str) -> HashMap<String, VerdictRecord> {
    let verdicts = match serde_json::from_str::<VerdictEnvelope>(body) {
        Ok(envelope) => envelope.verdicts,
        Err(e) => {
            warn!("Unexpected response body ({}), treating all packages as unknown", e);
            None
        }
    };

    let Some(verdicts) = verdicts else {
        warn!("Response contains no verdicts, treating all packages as unknown");
        return HashMap::new();
    };

    verdicts
        .into_iter()
        .map(|record| (record.pkg_ver.clone(), record))
        .collect()
}
