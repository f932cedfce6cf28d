//! The working set of candidate resolver IPs.

use std::fs;
use std::path::PathBuf;

use log::{debug, warn};
use rand::seq::IndexedRandom;

use crate::config::{DEFAULT_PUBLIC_RESOLVERS, DEFAULT_SAMPLE_SIZE};
use crate::error_handling::QueryError;

/// How many resolvers an attempt gets to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// One random resolver per attempt (the default).
    #[default]
    RandomOne,
    /// A random sample of the given size (capped at the pool size).
    Sample(usize),
    /// The whole pool, in its current order.
    All,
}

impl SelectionMode {
    /// Sample mode with the default size.
    pub fn sample() -> Self {
        SelectionMode::Sample(DEFAULT_SAMPLE_SIZE)
    }
}

/// Working list of candidate resolver IPs.
///
/// Built from a seed file or a compiled-in public list, shrunk in place as
/// resolvers prove unresponsive, and lazily reloaded from the seed file when
/// it drops to or below `min_size`. Owned explicitly by the caller and
/// passed into every executor call; concurrent use would need a mutex or a
/// copy-on-write snapshot around it.
#[derive(Debug, Clone)]
pub struct ResolverPool {
    ips: Vec<String>,
    seed_path: Option<PathBuf>,
    min_size: usize,
}

impl Default for ResolverPool {
    fn default() -> Self {
        ResolverPool::from_ips(DEFAULT_PUBLIC_RESOLVERS.iter().map(|ip| ip.to_string()))
    }
}

impl ResolverPool {
    /// A pool over a fixed list of IPs. Never reloads.
    pub fn from_ips(ips: impl IntoIterator<Item = String>) -> Self {
        ResolverPool {
            ips: ips.into_iter().collect(),
            seed_path: None,
            min_size: 0,
        }
    }

    /// A pool backed by a seed file, loaded lazily on first selection and
    /// reloaded whenever the pool shrinks to `min_size` or below.
    pub fn with_seed_file(path: PathBuf, min_size: usize) -> Self {
        ResolverPool {
            ips: Vec::new(),
            seed_path: Some(path),
            min_size,
        }
    }

    /// Parses seed file content: one resolver IP per line; blank lines and
    /// lines containing `:` (comments, IPv6-annotated entries) are skipped.
    fn parse_seed(text: &str) -> Vec<String> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.contains(':'))
            .map(str::to_string)
            .collect()
    }

    fn ensure_loaded(&mut self) {
        if self.ips.len() > self.min_size {
            return;
        }
        let Some(path) = &self.seed_path else {
            return;
        };
        match fs::read_to_string(path) {
            Ok(text) => {
                self.ips = Self::parse_seed(&text);
                debug!(
                    "loaded {} resolver candidates from {}",
                    self.ips.len(),
                    path.display()
                );
            }
            Err(err) => {
                warn!("could not reload resolver seed {}: {}", path.display(), err);
            }
        }
    }

    /// Picks this attempt's nameserver set.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::EmptyPool` when no candidates remain.
    pub fn select(&mut self, mode: SelectionMode) -> Result<Vec<String>, QueryError> {
        self.ensure_loaded();
        if self.ips.is_empty() {
            return Err(QueryError::EmptyPool);
        }
        let mut rng = rand::rng();
        let picked = match mode {
            SelectionMode::RandomOne => {
                // Non-empty pool, so choose() always yields.
                vec![self.ips.choose(&mut rng).cloned().unwrap_or_default()]
            }
            SelectionMode::Sample(size) => self
                .ips
                .choose_multiple(&mut rng, size.max(1))
                .cloned()
                .collect(),
            SelectionMode::All => self.ips.clone(),
        };
        Ok(picked)
    }

    /// Permanently removes a resolver for the remainder of process lifetime.
    pub fn remove(&mut self, ip: &str) {
        self.ips.retain(|candidate| candidate != ip);
    }

    pub fn contains(&self, ip: &str) -> bool {
        self.ips.iter().any(|candidate| candidate == ip)
    }

    pub fn len(&self) -> usize {
        self.ips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ips.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_seed_skips_blank_and_annotated_lines() {
        let text = "8.8.8.8\n\n# comment: not an ip\n2001:4860:4860::8888\n9.9.9.9\n";
        assert_eq!(ResolverPool::parse_seed(text), vec!["8.8.8.8", "9.9.9.9"]);
    }

    #[test]
    fn test_default_pool_is_populated() {
        let mut pool = ResolverPool::default();
        assert!(!pool.is_empty());
        let picked = pool.select(SelectionMode::RandomOne).unwrap();
        assert_eq!(picked.len(), 1);
        assert!(pool.contains(&picked[0]));
    }

    #[test]
    fn test_select_modes() {
        let mut pool =
            ResolverPool::from_ips(["1.1.1.1", "2.2.2.2", "3.3.3.3"].map(String::from));
        assert_eq!(pool.select(SelectionMode::All).unwrap().len(), 3);
        assert_eq!(pool.select(SelectionMode::Sample(2)).unwrap().len(), 2);
        // Sample larger than the pool is capped.
        assert_eq!(pool.select(SelectionMode::Sample(10)).unwrap().len(), 3);
    }

    #[test]
    fn test_remove_is_permanent_and_empties_to_error() {
        let mut pool = ResolverPool::from_ips(["1.1.1.1", "2.2.2.2"].map(String::from));
        pool.remove("1.1.1.1");
        assert!(!pool.contains("1.1.1.1"));
        pool.remove("2.2.2.2");
        assert!(matches!(
            pool.select(SelectionMode::RandomOne),
            Err(QueryError::EmptyPool)
        ));
    }

    #[test]
    fn test_seed_pool_reloads_when_below_minimum() {
        let mut seed = tempfile::NamedTempFile::new().unwrap();
        writeln!(seed, "1.1.1.1\n2.2.2.2\n3.3.3.3").unwrap();
        seed.flush().unwrap();

        let mut pool = ResolverPool::with_seed_file(seed.path().to_path_buf(), 1);
        assert_eq!(pool.select(SelectionMode::All).unwrap().len(), 3);

        pool.remove("1.1.1.1");
        // Still above the minimum: the pruned resolver stays gone.
        assert_eq!(pool.select(SelectionMode::All).unwrap().len(), 2);

        pool.remove("2.2.2.2");
        // At the minimum: the next selection reloads the seed file.
        assert_eq!(pool.select(SelectionMode::All).unwrap().len(), 3);
    }
}
