use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const OEMBED_URL: &str = "https://www.youtube.com/oembed";

/// Best-effort video title lookup. Implementations must never error: any
/// failure degrades to `None` so the surrounding create flow is never
/// blocked or failed by the network.
#[async_trait]
pub trait TitleLookup: Send + Sync {
    async fn lookup_title(&self, watch_url: &str) -> Option<String>;
}

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    title: Option<String>,
}

/// Fetches titles from YouTube's public oEmbed endpoint.
pub struct OEmbedClient {
    client: Client,
}

impl OEmbedClient {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("tubenote/1.0")
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }
}

#[async_trait]
impl TitleLookup for OEmbedClient {
    async fn lookup_title(&self, watch_url: &str) -> Option<String> {
        let request_url = format!(
            "{}?url={}&format=json",
            OEMBED_URL,
            urlencoding::encode(watch_url)
        );

        let response = match self.client.get(&request_url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("title lookup failed for {}: {}", watch_url, e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!(
                "title lookup for {} returned {}",
                watch_url,
                response.status()
            );
            return None;
        }

        let body: OEmbedResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!("title lookup returned bad JSON for {}: {}", watch_url, e);
                return None;
            }
        };

        body.title.filter(|t| !t.trim().is_empty())
    }
}

impl Default for OEmbedClient {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}
