// src/pipeline/fetcher.rs
use crate::config::HttpConfig;
use crate::models::Result;
use crate::pipeline::types::{ProbeResult, ProbeStatus};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, REFERER};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Performs single HTTP GETs with timeout and header rotation.
///
/// Stateless per call: whatever semaphore bounds the caller is the only
/// admission control. Faults never escape `fetch`; every failure mode is
/// translated into a `ProbeStatus`.
pub struct Fetcher {
    client: Client,
    referrers: Vec<String>,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(http: &HttpConfig, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(http.user_agent.clone())
            .connect_timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            referrers: http.referrers.clone(),
            timeout: Duration::from_secs(timeout_seconds),
        })
    }

    pub async fn fetch(&self, url: &str) -> ProbeResult {
        debug!("Fetching: {}", url);

        let mut request = self
            .client
            .get(url)
            .header(
                ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(ACCEPT_LANGUAGE, "nl-NL,nl;q=0.9,en-US;q=0.8,en;q=0.7")
            .timeout(self.timeout);

        if !self.referrers.is_empty() {
            let referer = &self.referrers[fastrand::usize(..self.referrers.len())];
            request = request.header(REFERER, referer.as_str());
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return Self::transport_failure(url, e),
        };

        let status = response.status();
        let fetched_url = response.url().to_string();

        if !status.is_success() {
            return ProbeResult {
                path: url.to_string(),
                fetched_url,
                status: ProbeStatus::HttpError(status.as_u16()),
                body: None,
                error: None,
            };
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return Self::transport_failure(url, e),
        };

        let body = decode_body(&bytes);
        debug!("Fetched {} bytes from {}", bytes.len(), url);

        ProbeResult {
            path: url.to_string(),
            fetched_url,
            status: ProbeStatus::Ok,
            body: Some(body),
            error: None,
        }
    }

    fn transport_failure(url: &str, error: reqwest::Error) -> ProbeResult {
        let status = if error.is_timeout() {
            ProbeStatus::Timeout
        } else {
            ProbeStatus::NetworkError
        };
        debug!("Fetch failed for {}: {}", url, error);
        ProbeResult {
            path: url.to_string(),
            fetched_url: url.to_string(),
            status,
            body: None,
            error: Some(error.to_string()),
        }
    }
}

/// UTF-8 first, then Latin-1, which maps every byte and so always yields
/// something the extractor can scan.
fn decode_body(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
