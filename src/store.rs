use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::client::{ClientError, DirectoryClient};
use crate::directory::{aggregate_companies, Company, User};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed { users: usize, companies: usize },
    /// Another refresh was already in flight; nothing was fetched.
    Skipped,
}

/// One refresh worth of collections.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub users: Vec<Arc<User>>,
    pub companies: Vec<Company>,
    /// Bumped every time the collections are replaced.
    pub generation: u64,
}

/// Owns the current collections and the refresh lifecycle. At most one
/// refresh runs at a time; overlapping triggers are skipped.
#[derive(Debug, Default)]
pub struct DirectoryStore {
    current: RwLock<Arc<Snapshot>>,
    in_flight: AtomicBool,
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl DirectoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        let current = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&current)
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Replaces both collections from a normalized user list.
    pub fn replace(&self, users: Vec<User>) -> Arc<Snapshot> {
        let users: Vec<Arc<User>> = users.into_iter().map(Arc::new).collect();
        let companies = aggregate_companies(&users);
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        let next = Arc::new(Snapshot {
            users,
            companies,
            generation: current.generation + 1,
        });
        *current = Arc::clone(&next);
        next
    }

    fn try_begin(&self) -> Option<InFlight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(&self.in_flight))
    }

    /// Fetches and replaces the collections. On failure the previous
    /// snapshot stays current and the error is returned.
    pub async fn refresh(&self, client: &DirectoryClient) -> Result<RefreshOutcome, ClientError> {
        let Some(_guard) = self.try_begin() else {
            debug!("refresh already in flight, skipping");
            return Ok(RefreshOutcome::Skipped);
        };
        match client.fetch_users().await {
            Ok(users) => {
                let snapshot = self.replace(users);
                Ok(RefreshOutcome::Refreshed {
                    users: snapshot.users.len(),
                    companies: snapshot.companies.len(),
                })
            }
            Err(e) => {
                warn!(error = %e, "error refreshing users, keeping previous data");
                Err(e)
            }
        }
    }
}
