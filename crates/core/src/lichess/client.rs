//! Lichess Opening Explorer client

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use super::types::*;
use crate::config::{Settings, DEFAULT_EXPLORER_URL};
use crate::error::{Error, Result};

pub struct ExplorerClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ExplorerClient {
    pub fn new() -> Result<Self> {
        Self::build(DEFAULT_EXPLORER_URL, None, Duration::from_secs(10))
    }

    pub fn with_token(token: String) -> Result<Self> {
        Self::build(DEFAULT_EXPLORER_URL, Some(token), Duration::from_secs(10))
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::build(
            &settings.explorer_url,
            settings.lichess_token.clone(),
            settings.timeout,
        )
    }

    fn build(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(ref token) = self.token {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, value);
            }
        }

        headers
    }

    /// Games played on Lichess
    pub async fn lichess(&self, params: &ExplorerParams) -> Result<ExplorerResponse> {
        let text = self.get("lichess", &params.to_query()).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Over-the-board master games
    pub async fn masters(&self, params: &ExplorerParams) -> Result<ExplorerResponse> {
        let text = self.get("masters", &params.to_query()).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// One player's games. The endpoint streams progressively more complete
    /// snapshots as NDJSON; the last one is returned.
    pub async fn player(&self, username: &str, params: &PlayerParams) -> Result<ExplorerResponse> {
        let text = self.get("player", &params.to_query(username)).await?;
        parse_last_snapshot(&text)
    }

    async fn get(&self, endpoint: &str, query: &[(&'static str, String)]) -> Result<String> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(%url, ?query, "explorer request");

        let response = self
            .client
            .get(&url)
            .headers(self.headers())
            .query(query)
            .send()
            .await
            .map_err(|e| Error::statistics(format!("request to {} failed", url), Some(e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, endpoint, "explorer returned an error");
            return Err(Error::statistics(format!("{} - {}", status, body.trim()), None));
        }

        response
            .text()
            .await
            .map_err(|e| Error::statistics("failed to read response body", Some(e)))
    }
}

fn parse_last_snapshot(text: &str) -> Result<ExplorerResponse> {
    let last = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .ok_or_else(|| Error::statistics("empty response from player explorer", None))?;

    Ok(serde_json::from_str(last)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_snapshot_wins() {
        let body = concat!(
            r#"{"white":1,"draws":0,"black":0,"moves":[]}"#,
            "\n",
            r#"{"white":3,"draws":1,"black":2,"moves":[]}"#,
            "\n\n"
        );

        let resp = parse_last_snapshot(body).unwrap();
        assert_eq!(resp.total(), 6);
    }

    #[test]
    fn test_empty_stream_is_statistics_error() {
        let err = parse_last_snapshot("\n \n").unwrap_err();
        assert!(matches!(err, Error::StatisticsUnavailable { .. }));
    }

    #[test]
    fn test_base_url_is_normalized() {
        let settings = Settings {
            explorer_url: "http://localhost:9000/".to_string(),
            ..Settings::default()
        };
        let client = ExplorerClient::from_settings(&settings).unwrap();
        assert_eq!(client.base_url, "http://localhost:9000");
    }

    #[test]
    fn test_token_header() {
        let client = ExplorerClient::with_token("lip_secret".to_string()).unwrap();
        let headers = client.headers();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer lip_secret");
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_statistics_error() {
        let settings = Settings {
            explorer_url: "http://127.0.0.1:1".to_string(),
            ..Settings::default()
        };
        let client = ExplorerClient::from_settings(&settings).unwrap();

        let err = client.lichess(&ExplorerParams::new()).await.unwrap_err();
        assert!(matches!(err, Error::StatisticsUnavailable { source: Some(_), .. }));
    }

    #[tokio::test]
    #[ignore] // network
    async fn test_lichess_starting_position() {
        let client = ExplorerClient::new().unwrap();
        let resp = client.lichess(&ExplorerParams::new().moves(5)).await.unwrap();
        assert!(resp.total() > 0);
        assert!(resp.moves.iter().any(|m| m.uci == "e2e4"));
    }
}
