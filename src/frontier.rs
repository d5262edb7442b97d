// src/frontier.rs
use crate::models::SiteIdentity;
use std::collections::HashSet;

/// Deduplicated, insertion-ordered worklist of sites to process.
///
/// Owned by the pipeline for the duration of one run; no insertion happens
/// once the run starts iterating it.
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    items: Vec<SiteIdentity>,
    seen: HashSet<(String, String)>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an identity; later duplicates of the same `(name, root_url)`
    /// key are silently dropped.
    pub fn add(&mut self, identity: SiteIdentity) {
        let key = (identity.name.clone(), identity.root_url.clone());
        if self.seen.insert(key) {
            self.items.push(identity);
        }
    }

    pub fn items(&self) -> &[SiteIdentity] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Extend<SiteIdentity> for Frontier {
    fn extend<T: IntoIterator<Item = SiteIdentity>>(&mut self, iter: T) {
        for identity in iter {
            self.add(identity);
        }
    }
}

impl FromIterator<SiteIdentity> for Frontier {
    fn from_iter<T: IntoIterator<Item = SiteIdentity>>(iter: T) -> Self {
        let mut frontier = Frontier::new();
        frontier.extend(iter);
        frontier
    }
}
