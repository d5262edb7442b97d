// src/sources.rs
use crate::frontier::Frontier;
use crate::models::{Result, SiteIdentity};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Discovery collaborator seam: anything that can produce site identities.
///
/// The search-result scraper lives behind this trait; the pipeline only
/// consumes the `(name, root_url)` pairs it yields.
#[async_trait]
pub trait SiteSource: Send + Sync {
    fn name(&self) -> &str;
    async fn discover(&self) -> Result<Vec<SiteIdentity>>;
}

/// A source backed by an already-materialized list of identities.
pub struct StaticSource {
    name: String,
    identities: Vec<SiteIdentity>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, identities: Vec<SiteIdentity>) -> Self {
        Self {
            name: name.into(),
            identities,
        }
    }
}

#[async_trait]
impl SiteSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn discover(&self) -> Result<Vec<SiteIdentity>> {
        Ok(self.identities.clone())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeedEntry {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeedFile {
    pub seeds: Vec<SeedEntry>,
}

/// Loads identities from a YAML seed file:
///
/// ```yaml
/// seeds:
///   - name: Acme Dental
///     url: https://acme.example
/// ```
pub struct SeedFileSource {
    path: String,
}

impl SeedFileSource {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SiteSource for SeedFileSource {
    fn name(&self) -> &str {
        &self.path
    }

    async fn discover(&self) -> Result<Vec<SiteIdentity>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let file: SeedFile = serde_yaml::from_str(&content)?;
        Ok(file
            .seeds
            .into_iter()
            .map(|entry| SiteIdentity::new(entry.name, entry.url))
            .collect())
    }
}

/// Drains every source into the frontier, returning how many identities
/// were actually admitted after deduplication.
pub async fn fill_frontier(
    frontier: &mut Frontier,
    sources: &[Box<dyn SiteSource>],
) -> Result<usize> {
    let before = frontier.len();
    for source in sources {
        let identities = source.discover().await?;
        info!(
            "Source {} yielded {} identities",
            source.name(),
            identities.len()
        );
        frontier.extend(identities);
    }
    Ok(frontier.len() - before)
}
