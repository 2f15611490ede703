use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::core::config::Settings;

pub(crate) const JSONPLACEHOLDER_ENDPOINTS: [&str; 4] = ["posts", "users", "comments", "todos"];
const JSONPLACEHOLDER_LIMIT: &str = "10";

/// Read-only passthrough to the public demo APIs shown in the admin area.
#[derive(Debug, Clone)]
pub(crate) struct ExternalApiClient {
    client: Client,
    countries_url: String,
    jsonplaceholder_url: String,
}

impl ExternalApiClient {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Self> {
        let external = settings.external_api();
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(external.timeout_seconds.min(5)))
            .timeout(Duration::from_secs(external.timeout_seconds))
            .build()
            .context("Failed to build external API HTTP client")?;

        Ok(Self {
            client,
            countries_url: external.countries_url.clone(),
            jsonplaceholder_url: external.jsonplaceholder_url.trim_end_matches('/').to_string(),
        })
    }

    pub(crate) async fn countries(&self) -> Result<Value> {
        self.get_json(&self.countries_url, &[]).await
    }

    /// `endpoint` must already be one of [`JSONPLACEHOLDER_ENDPOINTS`].
    pub(crate) async fn jsonplaceholder(&self, endpoint: &str) -> Result<Value> {
        let url = jsonplaceholder_url(&self.jsonplaceholder_url, endpoint)
            .with_context(|| format!("Unsupported endpoint '{endpoint}'"))?;
        self.get_json(&url, &[("_limit", JSONPLACEHOLDER_LIMIT)]).await
    }

    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("Upstream {url} returned an error status"))?;

        response.json::<Value>().await.with_context(|| format!("Upstream {url} returned invalid JSON"))
    }
}

pub(crate) fn jsonplaceholder_url(base: &str, endpoint: &str) -> Option<String> {
    JSONPLACEHOLDER_ENDPOINTS
        .contains(&endpoint)
        .then(|| format!("{}/{endpoint}", base.trim_end_matches('/')))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_known_endpoints_are_forwarded() {
        let base = "https://jsonplaceholder.typicode.com/";
        assert_eq!(
            jsonplaceholder_url(base, "posts").as_deref(),
            Some("https://jsonplaceholder.typicode.com/posts")
        );
        assert_eq!(jsonplaceholder_url(base, "albums"), None);
        assert_eq!(jsonplaceholder_url(base, "../users"), None);
    }
}
