// src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// One business candidate as produced by the discovery collaborator.
/// The `(name, root_url)` pair is the identity key, case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SiteIdentity {
    pub name: String,
    pub root_url: String,
}

impl SiteIdentity {
    pub fn new(name: impl Into<String>, root_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root_url: root_url.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailCategory {
    Contact,
    Support,
    Sales,
    Admin,
    Personal,
    Other,
}

/// A validated, lowercased email address found on a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRecord {
    pub address: String,
    pub category: EmailCategory,
    /// True when the address shares the scraped site's base domain.
    pub domain_match: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompanyStatus {
    Success,
    NoContactFound,
    Error(String),
}

/// Consolidated result for one SiteIdentity. Created once by a site worker,
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub identity: SiteIdentity,
    pub website_url: String,
    /// First email discovered, by probe completion order.
    pub primary_email: Option<String>,
    /// All discovered emails, deduplicated by address.
    pub emails: Vec<EmailRecord>,
    /// Number of candidate pages actually fetched (skipped paths excluded).
    pub pages_checked: usize,
    pub status: CompanyStatus,
    pub scraped_at: DateTime<Utc>,
}

impl Company {
    pub fn failed(identity: SiteIdentity, reason: impl Into<String>) -> Self {
        let website_url = identity.root_url.clone();
        Self {
            identity,
            website_url,
            primary_email: None,
            emails: Vec::new(),
            pages_checked: 0,
            status: CompanyStatus::Error(reason.into()),
            scraped_at: Utc::now(),
        }
    }

    pub fn has_email(&self) -> bool {
        !self.emails.is_empty()
    }
}
