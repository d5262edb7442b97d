// src/pipeline/types.rs
use crate::models::EmailRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    Ok,
    HttpError(u16),
    Timeout,
    NetworkError,
    /// Never fetched: the early-stop or cancellation flag was already set
    /// when this path's turn came.
    SkippedByPolicy,
}

/// Outcome of fetching one candidate page. Owned by the fetcher call,
/// consumed immediately by the site worker.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    /// The candidate URL that was requested.
    pub path: String,
    /// Final URL after redirects, when a response arrived.
    pub fetched_url: String,
    pub status: ProbeStatus,
    pub body: Option<String>,
    /// Diagnostic detail for transport-level failures.
    pub error: Option<String>,
}

impl ProbeResult {
    pub fn skipped(url: &str) -> Self {
        Self {
            path: url.to_string(),
            fetched_url: url.to_string(),
            status: ProbeStatus::SkippedByPolicy,
            body: None,
            error: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ProbeStatus::Ok
    }

    /// Whether a fetch was actually issued for this path.
    pub fn was_attempted(&self) -> bool {
        self.status != ProbeStatus::SkippedByPolicy
    }

    pub fn failure_reason(&self) -> Option<String> {
        match &self.status {
            ProbeStatus::Ok | ProbeStatus::SkippedByPolicy => None,
            ProbeStatus::HttpError(code) => Some(format!("HTTP {} on {}", code, self.path)),
            ProbeStatus::Timeout => Some(format!("timeout fetching {}", self.path)),
            ProbeStatus::NetworkError => Some(
                self.error
                    .clone()
                    .unwrap_or_else(|| format!("network error fetching {}", self.path)),
            ),
        }
    }
}

/// One candidate page resolved: its probe plus whatever the extractor
/// found in the body. Flows through the per-site completion channel.
#[derive(Debug)]
pub struct PathOutcome {
    pub probe: ProbeResult,
    pub emails: Vec<EmailRecord>,
}
