// src/lib.rs
//! Concurrent contact-discovery pipeline: takes candidate site identities
//! from a discovery source, probes each site's likely contact pages under
//! layered concurrency limits, and extracts classified email addresses
//! into one consolidated Company record per site.

pub mod config;
pub mod frontier;
pub mod models;
pub mod pipeline;
pub mod progress;
pub mod sources;

use tracing_subscriber::EnvFilter;

pub use config::{load_config, Config};
pub use frontier::Frontier;
pub use models::{Company, CompanyStatus, EmailCategory, EmailRecord, Result, SiteIdentity};
pub use pipeline::{Pipeline, RunHandle};
pub use progress::{Phase, ProgressSnapshot, ProgressTracker};
pub use sources::{fill_frontier, SeedFileSource, SiteSource, StaticSource};

/// Installs a global tracing subscriber honoring the configured level.
/// `RUST_LOG` wins when set. Embedders with their own subscriber can skip
/// this entirely.
pub fn init_logging(config: &config::LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).try_init()?;
    Ok(())
}
