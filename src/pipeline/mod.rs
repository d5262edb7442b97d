// src/pipeline/mod.rs
pub mod coordinator;
pub mod email_extractor;
pub mod fetcher;
pub mod paths;
pub mod site_worker;
pub mod types;

pub use coordinator::{Pipeline, RunHandle};
pub use email_extractor::{base_domain, site_base_domain, EmailExtractor};
pub use fetcher::Fetcher;
pub use paths::expand_candidates;
pub use site_worker::SiteWorker;
pub use types::{PathOutcome, ProbeResult, ProbeStatus};
