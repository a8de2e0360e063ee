use super::client::HttpClient;
use crate::error::RollupError;
use std::time::Duration;
use tracing::debug;

/// Blocking HTTP client with request and connect timeouts.
pub struct BasicClient(reqwest::blocking::Client);

impl BasicClient {
    pub fn new() -> Result<Self, RollupError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| RollupError::DataUnavailable(format!("failed to build HTTP client: {e}")))?;
        Ok(Self(client))
    }
}

impl HttpClient for BasicClient {
    fn get(&self, url: &str) -> Result<String, RollupError> {
        debug!(url, "GET");
        let response = self
            .0
            .get(url)
            .send()
            .map_err(|e| RollupError::DataUnavailable(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(RollupError::DataUnavailable(format!(
                "source returned status {status}: {body}"
            )));
        }

        response
            .text()
            .map_err(|e| RollupError::DataUnavailable(format!("failed to read response body: {e}")))
    }
}
