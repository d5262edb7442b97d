// src/pipeline/email_extractor.rs
use crate::config::ExtractionConfig;
use crate::models::{EmailCategory, EmailRecord, Result};
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

const ASSET_EXTENSIONS: [&str; 6] = [".png", ".jpg", ".gif", ".svg", ".js", ".css"];

const EMAIL_GRAMMAR: &str = r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}";

/// Extracts, validates and classifies email addresses from raw page
/// content. Pure: same input text always yields the same records.
pub struct EmailExtractor {
    /// Ordered extraction patterns; matches from all of them are unioned.
    patterns: Vec<Regex>,
    categories: Vec<(EmailCategory, Vec<String>)>,
    allowed_tlds: HashSet<String>,
    placeholders: Vec<String>,
}

impl EmailExtractor {
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        let patterns = vec![
            Regex::new(EMAIL_GRAMMAR)?,
            Regex::new(&format!(r"mailto:({})", EMAIL_GRAMMAR))?,
            Regex::new(&format!(
                r"(?i)(?:e-?mail|mail|contact|info)\s*:\s*({})",
                EMAIL_GRAMMAR
            ))?,
            Regex::new(r"(?i)\b(?:info|contact|office|hello|mail)@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")?,
        ];

        Ok(Self {
            patterns,
            categories: config
                .categories
                .iter()
                .map(|rule| {
                    (
                        rule.category,
                        rule.keywords.iter().map(|k| k.to_lowercase()).collect(),
                    )
                })
                .collect(),
            allowed_tlds: config
                .allowed_tlds
                .iter()
                .map(|t| t.to_lowercase())
                .collect(),
            placeholders: config
                .placeholder_patterns
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
        })
    }

    /// Returns discovered emails in first-seen order, deduplicated by
    /// address. `site_base_domain` drives the domain-affinity flag.
    pub fn extract(&self, text: &str, site_base_domain: &str) -> Vec<EmailRecord> {
        let mut seen = HashSet::new();
        let mut records = Vec::new();

        for pattern in &self.patterns {
            for caps in pattern.captures_iter(text) {
                if let Some(m) = caps.get(1).or_else(|| caps.get(0)) {
                    self.admit(m.as_str(), site_base_domain, &mut seen, &mut records);
                }
            }
        }

        for href in mailto_hrefs(text) {
            self.admit(&href, site_base_domain, &mut seen, &mut records);
        }

        debug!("Extracted {} unique emails", records.len());
        records
    }

    fn admit(
        &self,
        raw: &str,
        site_base_domain: &str,
        seen: &mut HashSet<String>,
        records: &mut Vec<EmailRecord>,
    ) {
        let address = raw.to_lowercase();
        if !self.is_valid(&address) || !seen.insert(address.clone()) {
            return;
        }

        let (local, domain) = match address.split_once('@') {
            Some(parts) => parts,
            None => return,
        };
        let category = self.classify(local);
        let domain_match = shares_base_domain(domain, site_base_domain);
        records.push(EmailRecord {
            address: address.clone(),
            category,
            domain_match,
        });
    }

    fn is_valid(&self, address: &str) -> bool {
        if address.len() <= 5 || address.len() >= 100 {
            return false;
        }
        if ASSET_EXTENSIONS.iter().any(|ext| address.ends_with(ext)) {
            return false;
        }

        let (local, domain) = match address.split_once('@') {
            Some(parts) => parts,
            None => return false,
        };
        if local.is_empty() || domain.contains('@') || !domain.contains('.') {
            return false;
        }
        if self.is_placeholder(address, local, domain) {
            return false;
        }

        match domain.rsplit('.').next() {
            Some(tld) => self.allowed_tlds.contains(tld),
            None => false,
        }
    }

    /// Deny-list patterns are position-aware: `word@` matches against the
    /// local side, `@word` against the whole domain or its final label,
    /// and a bare word against the local part only — so a real domain
    /// like `example.com` is never mistaken for a placeholder.
    fn is_placeholder(&self, address: &str, local: &str, domain: &str) -> bool {
        self.placeholders.iter().any(|pattern| {
            if let Some(word) = pattern.strip_prefix('@') {
                domain == word || domain.ends_with(&format!(".{}", word))
            } else if pattern.ends_with('@') {
                address.contains(pattern.as_str())
            } else {
                local.contains(pattern.as_str())
            }
        })
    }

    /// First category whose keyword list hits the local part wins; rules
    /// are evaluated in configured order.
    fn classify(&self, local: &str) -> EmailCategory {
        for (category, keywords) in &self.categories {
            if keywords.iter().any(|keyword| local.contains(keyword)) {
                return *category;
            }
        }
        EmailCategory::Other
    }
}

/// `mailto:` hrefs from anchor tags, query parts stripped. Complements the
/// regex pass for obfuscated markup the bare grammar misses.
fn mailto_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").unwrap();

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| href.strip_prefix("mailto:"))
        .map(|rest| rest.split('?').next().unwrap_or(rest).trim().to_string())
        .filter(|address| !address.is_empty())
        .collect()
}

/// Last two DNS labels of a hostname: `shop.example.com` → `example.com`.
pub fn base_domain(host: &str) -> String {
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() >= 2 {
        labels[labels.len() - 2..].join(".")
    } else {
        host.to_string()
    }
}

/// Base domain of the site being scraped, from its root URL.
pub fn site_base_domain(root_url: &str) -> String {
    Url::parse(root_url)
        .ok()
        .and_then(|url| url.host_str().map(|host| base_domain(&host.to_lowercase())))
        .unwrap_or_default()
}

fn shares_base_domain(email_domain: &str, site_base: &str) -> bool {
    if site_base.is_empty() {
        return false;
    }
    email_domain == site_base || email_domain.ends_with(&format!(".{}", site_base))
}
