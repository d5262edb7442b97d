// src/pipeline/site_worker.rs
use crate::config::Config;
use crate::models::{Company, CompanyStatus, SiteIdentity};
use crate::pipeline::email_extractor::{site_base_domain, EmailExtractor};
use crate::pipeline::fetcher::Fetcher;
use crate::pipeline::paths::expand_candidates;
use crate::pipeline::types::{PathOutcome, ProbeResult};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, info, warn};

/// Processes one site: probes its candidate pages under the per-site
/// concurrency cap and assembles exactly one Company.
pub struct SiteWorker {
    fetcher: Arc<Fetcher>,
    extractor: Arc<EmailExtractor>,
    config: Arc<Config>,
}

impl SiteWorker {
    pub fn new(fetcher: Arc<Fetcher>, extractor: Arc<EmailExtractor>, config: Arc<Config>) -> Self {
        Self {
            fetcher,
            extractor,
            config,
        }
    }

    /// Never fails: every path failure is folded into the Company status.
    ///
    /// Early stop: once any probe yields an email, paths still waiting for
    /// a permit are skipped; probes already in flight finish and their
    /// emails are merged. The primary email is the first one discovered by
    /// completion order.
    pub async fn process(&self, identity: &SiteIdentity, cancel: Arc<AtomicBool>) -> Company {
        debug!("🕷️  Probing {}: {}", identity.name, identity.root_url);

        let candidates = expand_candidates(
            &identity.root_url,
            &self.config.extraction.contact_paths,
            self.config.pipeline.max_candidate_paths,
        );
        let base_domain = site_base_domain(&identity.root_url);

        let stop = Arc::new(AtomicBool::new(false));
        let semaphore = Arc::new(Semaphore::new(self.config.pipeline.per_site_concurrency));
        let (tx, mut rx) = mpsc::channel::<PathOutcome>(candidates.len().max(1));

        for url in &candidates {
            let url = url.clone();
            let base_domain = base_domain.clone();
            let fetcher = Arc::clone(&self.fetcher);
            let extractor = Arc::clone(&self.extractor);
            let semaphore = Arc::clone(&semaphore);
            let stop = Arc::clone(&stop);
            let cancel = Arc::clone(&cancel);
            let tx = tx.clone();

            tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        let _ = tx.send(skipped_outcome(&url)).await;
                        return;
                    }
                };

                // Admission check happens after the permit arrives, so a
                // stop decision taken while we were queued is honored.
                if stop.load(Ordering::SeqCst) || cancel.load(Ordering::SeqCst) {
                    let _ = tx.send(skipped_outcome(&url)).await;
                    return;
                }

                let probe = fetcher.fetch(&url).await;
                let emails = match (&probe.body, probe.is_ok()) {
                    (Some(body), true) => extractor.extract(body, &base_domain),
                    _ => Vec::new(),
                };

                // Flip the stop flag before the permit is released so the
                // next queued path sees it.
                if !emails.is_empty() {
                    stop.store(true, Ordering::SeqCst);
                }

                let _ = tx.send(PathOutcome { probe, emails }).await;
            });
        }
        drop(tx);

        let mut pages_checked = 0;
        let mut any_ok = false;
        let mut first_error: Option<String> = None;
        let mut primary_email: Option<String> = None;
        let mut seen_addresses = HashSet::new();
        let mut emails = Vec::new();

        while let Some(outcome) = rx.recv().await {
            if outcome.probe.was_attempted() {
                pages_checked += 1;
            }
            if outcome.probe.is_ok() {
                any_ok = true;
            } else if let Some(reason) = outcome.probe.failure_reason() {
                if first_error.is_none() {
                    first_error = Some(reason);
                }
            }

            for record in outcome.emails {
                if seen_addresses.insert(record.address.clone()) {
                    if primary_email.is_none() {
                        primary_email = Some(record.address.clone());
                    }
                    emails.push(record);
                }
            }
        }

        let status = if !emails.is_empty() {
            info!(
                "✅ {}: {} email(s), primary {}",
                identity.name,
                emails.len(),
                primary_email.as_deref().unwrap_or("-")
            );
            CompanyStatus::Success
        } else if any_ok {
            debug!("No email found for {}", identity.name);
            CompanyStatus::NoContactFound
        } else {
            let reason = first_error.unwrap_or_else(|| {
                // No probe was even attempted: distinguish cancellation
                // from a site with nothing fetchable.
                if cancel.load(Ordering::SeqCst) {
                    "run cancelled".to_string()
                } else {
                    "no pages fetched".to_string()
                }
            });
            warn!("❌ {}: {}", identity.name, reason);
            CompanyStatus::Error(reason)
        };

        Company {
            identity: identity.clone(),
            website_url: identity.root_url.clone(),
            primary_email,
            emails,
            pages_checked,
            status,
            scraped_at: Utc::now(),
        }
    }
}

fn skipped_outcome(url: &str) -> PathOutcome {
    PathOutcome {
        probe: ProbeResult::skipped(url),
        emails: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worker() -> SiteWorker {
        let config = Arc::new(Config::default());
        let fetcher = Arc::new(
            Fetcher::new(&config.http, config.pipeline.fetch_timeout_seconds).expect("fetcher"),
        );
        let extractor = Arc::new(EmailExtractor::new(&config.extraction).expect("extractor"));
        SiteWorker::new(fetcher, extractor, config)
    }

    #[tokio::test]
    async fn cancelled_site_reports_run_cancelled_without_fetching() {
        let identity = SiteIdentity::new("Acme", "http://127.0.0.1:9");
        let cancel = Arc::new(AtomicBool::new(true));

        let company = worker().process(&identity, cancel).await;

        assert_eq!(company.status, CompanyStatus::Error("run cancelled".to_string()));
        assert_eq!(company.pages_checked, 0);
        assert!(company.emails.is_empty());
    }
}
