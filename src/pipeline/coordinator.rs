// src/pipeline/coordinator.rs
use crate::config::Config;
use crate::frontier::Frontier;
use crate::models::{Company, Result};
use crate::pipeline::email_extractor::EmailExtractor;
use crate::pipeline::fetcher::Fetcher;
use crate::pipeline::site_worker::SiteWorker;
use crate::progress::{Phase, ProgressSnapshot, ProgressTracker};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Semaphore};
use tracing::info;
use uuid::Uuid;

/// Observer/control handle for one run: progress subscription plus the
/// cancellation switch. Clonable, so a presentation layer can poll from
/// anywhere without touching the pipeline itself.
#[derive(Debug, Clone)]
pub struct RunHandle {
    run_id: Uuid,
    progress: watch::Receiver<ProgressSnapshot>,
    cancel: Arc<AtomicBool>,
}

impl RunHandle {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        *self.progress.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.progress.clone()
    }

    /// Requests cancellation: in-flight fetches finish or time out
    /// normally, but no new site or path is admitted.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }
}

/// One contact-discovery run session. Owns the progress writer and the
/// cancellation flag; concurrent runs are fully isolated from each other.
pub struct Pipeline {
    config: Arc<Config>,
    fetcher: Arc<Fetcher>,
    extractor: Arc<EmailExtractor>,
    progress: ProgressTracker,
    cancel: Arc<AtomicBool>,
    run_id: Uuid,
}

impl Pipeline {
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = Fetcher::new(&config.http, config.pipeline.fetch_timeout_seconds)?;
        let extractor = EmailExtractor::new(&config.extraction)?;
        Ok(Self {
            config: Arc::new(config),
            fetcher: Arc::new(fetcher),
            extractor: Arc::new(extractor),
            progress: ProgressTracker::new(),
            cancel: Arc::new(AtomicBool::new(false)),
            run_id: Uuid::new_v4(),
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn handle(&self) -> RunHandle {
        RunHandle {
            run_id: self.run_id,
            progress: self.progress.subscribe(),
            cancel: Arc::clone(&self.cancel),
        }
    }

    /// Runs every frontier identity under the global concurrency cap and
    /// returns one Company per identity, in frontier order.
    ///
    /// A run-level error is reserved for configuration problems; per-site
    /// failures are folded into their Company records.
    pub async fn run(&self, frontier: Frontier) -> Result<Vec<Company>> {
        if frontier.is_empty() {
            self.progress.finish(Phase::Error);
            return Err("frontier is empty, nothing to process".into());
        }

        let total = frontier.len();
        info!("🚀 Run {}: processing {} site(s)", self.run_id, total);
        self.progress.begin_phase(Phase::Processing, total);

        let semaphore = Arc::new(Semaphore::new(self.config.pipeline.max_concurrent_sites));
        let (tx, mut rx) = mpsc::channel::<(usize, Company)>(total);

        for (index, identity) in frontier.items().iter().cloned().enumerate() {
            let worker = SiteWorker::new(
                Arc::clone(&self.fetcher),
                Arc::clone(&self.extractor),
                Arc::clone(&self.config),
            );
            let semaphore = Arc::clone(&semaphore);
            let cancel = Arc::clone(&self.cancel);
            let tx = tx.clone();

            tokio::spawn(async move {
                let company = match semaphore.acquire_owned().await {
                    // The permit is held for the worker's whole lifetime,
                    // bounding simultaneous sites.
                    Ok(_permit) => {
                        if cancel.load(Ordering::SeqCst) {
                            Company::failed(identity, "run cancelled")
                        } else {
                            worker.process(&identity, cancel).await
                        }
                    }
                    Err(_) => Company::failed(identity, "run cancelled"),
                };
                let _ = tx.send((index, company)).await;
            });
        }
        drop(tx);

        let progress_interval = self.config.logging.progress_interval.max(1);
        let mut indexed = Vec::with_capacity(total);
        while let Some((index, company)) = rx.recv().await {
            self.progress.record_completion();
            let completed = self.progress.snapshot().completed;
            if completed % progress_interval == 0 || completed == total {
                info!("Progress: {}/{} sites processed", completed, total);
            }
            indexed.push((index, company));
        }

        indexed.sort_by_key(|(index, _)| *index);
        let companies: Vec<Company> = indexed.into_iter().map(|(_, company)| company).collect();

        self.progress.finish(Phase::Complete);
        info!(
            "🏁 Run {} complete: {}/{} sites yielded an email",
            self.run_id,
            companies.iter().filter(|c| c.has_email()).count(),
            total
        );
        Ok(companies)
    }
}
