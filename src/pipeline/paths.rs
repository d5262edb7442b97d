// src/pipeline/paths.rs
use std::collections::HashSet;
use url::{Host, Url};

/// Expands a root URL into the ordered, deduplicated list of candidate
/// pages to probe for contact info.
///
/// The root comes first, then each configured relative path against the
/// `www.` and bare forms of the host. IP hosts get no `www.` variant.
/// Pure function: no I/O, stable output for a given input.
pub fn expand_candidates(root_url: &str, contact_paths: &[String], cap: usize) -> Vec<String> {
    let mut candidates = Vec::new();
    let mut seen = HashSet::new();

    seen.insert(root_url.to_string());
    candidates.push(root_url.to_string());

    let parsed = match Url::parse(root_url) {
        Ok(url) => url,
        // Leave the malformed root as the only candidate; the fetcher will
        // surface it as a transport failure.
        Err(_) => return candidates,
    };

    let host_forms = match parsed.host() {
        Some(Host::Domain(domain)) => {
            let bare = domain.strip_prefix("www.").unwrap_or(domain);
            vec![format!("www.{}", bare), bare.to_string()]
        }
        Some(other) => vec![other.to_string()],
        None => return candidates,
    };

    let scheme = parsed.scheme();
    let port = parsed
        .port()
        .map(|p| format!(":{}", p))
        .unwrap_or_default();

    'outer: for path in contact_paths {
        let path = path.trim_matches('/');
        for host in &host_forms {
            let candidate = format!("{}://{}{}/{}", scheme, host, port, path);
            if seen.insert(candidate.clone()) {
                candidates.push(candidate);
            }
            if candidates.len() >= cap {
                break 'outer;
            }
        }
    }

    candidates.truncate(cap);
    candidates
}
