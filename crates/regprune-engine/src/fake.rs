//! In-memory registry used by the engine and runner tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use regprune_registry::{Registry, RegistryError};

/// Registry double backed by a map of repository → tag → digest.
///
/// Deleting a digest removes every tag that points at it, like a real
/// registry. A tag registered without a manifest answers 404 on lookup.
#[derive(Debug, Default)]
pub struct FakeRegistry {
    repositories: Mutex<HashMap<String, BTreeMap<String, Option<String>>>>,
    failing_lists: HashSet<String>,
    reject_deletes: Option<u16>,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    digest_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn digest_for(repository: &str, tag: &str) -> String {
        format!("sha256:{repository}-{tag}")
    }

    pub fn with_repository(self, repository: &str, tags: &[&str]) -> Self {
        {
            let mut repos = self.repositories.lock().unwrap();
            let entry = repos.entry(repository.to_string()).or_default();
            for tag in tags {
                entry.insert((*tag).to_string(), Some(Self::digest_for(repository, tag)));
            }
        }
        self
    }

    pub fn without_manifest(self, repository: &str, tag: &str) -> Self {
        self.repositories
            .lock()
            .unwrap()
            .entry(repository.to_string())
            .or_default()
            .insert(tag.to_string(), None);
        self
    }

    pub fn failing_list(mut self, repository: &str) -> Self {
        self.failing_lists.insert(repository.to_string());
        self
    }

    pub const fn rejecting_deletes(mut self, status: u16) -> Self {
        self.reject_deletes = Some(status);
        self
    }

    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Remaining tags of a repository, sorted as strings.
    pub fn tags(&self, repository: &str) -> Vec<String> {
        self.repositories
            .lock()
            .unwrap()
            .get(repository)
            .map(|tags| tags.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn digest_calls(&self) -> usize {
        self.digest_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Registry for FakeRegistry {
    async fn list_tags(&self, repository: &str) -> Result<Vec<String>, RegistryError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_lists.contains(repository) {
            return Err(RegistryError::Transport {
                message: "connection reset by peer".to_string(),
            });
        }

        Ok(self.tags(repository))
    }

    async fn get_digest(&self, repository: &str, tag: &str) -> Result<String, RegistryError> {
        self.digest_calls.fetch_add(1, Ordering::SeqCst);

        self.repositories
            .lock()
            .unwrap()
            .get(repository)
            .and_then(|tags| tags.get(tag).cloned().flatten())
            .ok_or_else(|| RegistryError::NotFound {
                repository: repository.to_string(),
                reference: tag.to_string(),
            })
    }

    async fn delete_manifest(&self, repository: &str, digest: &str) -> Result<(), RegistryError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(status) = self.reject_deletes {
            return Err(RegistryError::HttpError {
                status,
                message: "The operation is unsupported.".to_string(),
            });
        }

        let mut repos = self.repositories.lock().unwrap();
        let tags = repos.get_mut(repository).ok_or_else(|| RegistryError::HttpError {
            status: 404,
            message: "NAME_UNKNOWN".to_string(),
        })?;

        let before = tags.len();
        tags.retain(|_, d| d.as_deref() != Some(digest));
        if tags.len() == before {
            return Err(RegistryError::HttpError {
                status: 404,
                message: "MANIFEST_UNKNOWN".to_string(),
            });
        }

        Ok(())
    }
}
