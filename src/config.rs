// src/config.rs
use crate::models::EmailCategory;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub http: HttpConfig,
    pub extraction: ExtractionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Global cap on simultaneously processed sites.
    pub max_concurrent_sites: usize,
    /// Cap on simultaneous page fetches within one site.
    pub per_site_concurrency: usize,
    /// Maximum candidate pages probed per site, root included.
    pub max_candidate_paths: usize,
    pub fetch_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    pub user_agent: String,
    /// Referrer pool rotated across requests.
    pub referrers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CategoryRule {
    pub category: EmailCategory,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractionConfig {
    /// Relative paths probed for contact info, in priority order.
    pub contact_paths: Vec<String>,
    /// Ordered category rules; the first keyword hit on the local part wins.
    pub categories: Vec<CategoryRule>,
    pub allowed_tlds: Vec<String>,
    /// Substrings marking placeholder addresses to discard.
    pub placeholder_patterns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    /// Emit a progress log line every N completed sites.
    pub progress_interval: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig {
                max_concurrent_sites: 5,
                per_site_concurrency: 2,
                max_candidate_paths: 9,
                fetch_timeout_seconds: 10,
            },
            http: HttpConfig {
                user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                             (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
                referrers: vec![
                    "https://www.google.com/".to_string(),
                    "https://www.google.nl/".to_string(),
                    "https://www.bing.com/".to_string(),
                    "https://search.yahoo.com/".to_string(),
                    "https://duckduckgo.com/".to_string(),
                ],
            },
            extraction: ExtractionConfig {
                contact_paths: vec![
                    "contact".to_string(),
                    "contact-us".to_string(),
                    "contacts".to_string(),
                    "contact-page".to_string(),
                    "about".to_string(),
                    "about-us".to_string(),
                    "over-ons".to_string(),
                    "team".to_string(),
                ],
                categories: vec![
                    CategoryRule {
                        category: EmailCategory::Contact,
                        keywords: str_vec(&["contact", "info", "inquiries", "enquiries", "general"]),
                    },
                    CategoryRule {
                        category: EmailCategory::Support,
                        keywords: str_vec(&["support", "help", "service", "services", "customer"]),
                    },
                    CategoryRule {
                        category: EmailCategory::Sales,
                        keywords: str_vec(&["sales", "order", "orders", "business", "marketing"]),
                    },
                    CategoryRule {
                        category: EmailCategory::Admin,
                        keywords: str_vec(&[
                            "admin",
                            "administrator",
                            "webmaster",
                            "hostmaster",
                            "postmaster",
                        ]),
                    },
                    CategoryRule {
                        category: EmailCategory::Personal,
                        keywords: str_vec(&["john", "jane", "david", "mike", "sarah", "jennifer"]),
                    },
                ],
                allowed_tlds: str_vec(&[
                    "com", "org", "net", "edu", "io", "gov", "co", "info", "biz", "de", "uk",
                    "fr", "es", "it", "nl",
                ]),
                placeholder_patterns: str_vec(&["example", "test@", "@example", "@test"]),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                progress_interval: 10,
            },
        }
    }
}

fn str_vec(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub async fn load_config(
    path: &str,
) -> std::result::Result<Config, Box<dyn std::error::Error + Send + Sync>> {
    let content = tokio::fs::read_to_string(path).await?;
    let config: Config = serde_yaml::from_str(&content)?;
    Ok(config)
}
