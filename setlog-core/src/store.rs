//! Shared set store.
//!
//! Holds the one page of sets every list view displays. Views never write to
//! it directly: they ask for a [`SetStore::refresh`] and observe the result
//! through [`SetStore::subscribe`].
//!
//! ## Ordering
//!
//! Responses may complete in any order. Each refresh takes a sequence number
//! at the moment it is issued, and a successful response is applied only if
//! its number is still the latest issued. Superseded requests still run to
//! completion; their results are dropped.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::error::GatewayError;
use crate::gateway::SetGateway;
use crate::models::SetPage;
use crate::query::QueryParams;

/// What happened to a successful response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The page is now the store's current result
    Applied { sequence: u64 },
    /// A newer refresh was issued before this one completed
    Superseded { sequence: u64, latest: u64 },
}

impl RefreshOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, RefreshOutcome::Applied { .. })
    }
}

pub struct SetStore {
    gateway: Arc<dyn SetGateway>,
    issued: AtomicU64,
    current: watch::Sender<Arc<SetPage>>,
}

impl SetStore {
    pub fn new(gateway: Arc<dyn SetGateway>) -> Self {
        let (current, _) = watch::channel(Arc::new(SetPage::empty()));
        Self {
            gateway,
            issued: AtomicU64::new(0),
            current,
        }
    }

    /// Returns the current page. Cheap; the page itself is shared.
    pub fn current(&self) -> Arc<SetPage> {
        self.current.borrow().clone()
    }

    /// Registers an observer. The receiver sees every applied page.
    pub fn subscribe(&self) -> watch::Receiver<Arc<SetPage>> {
        self.current.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.current.receiver_count()
    }

    /// Sequence number of the most recently issued refresh (0 if none).
    pub fn latest_issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    /// Fetches the page for `params` and makes it current unless a newer
    /// refresh has been issued in the meantime.
    ///
    /// The request counts as issued when this method is called, not when the
    /// returned future is first polled. On error the current page is left as
    /// it was.
    pub fn refresh(
        &self,
        params: &QueryParams,
    ) -> impl Future<Output = Result<RefreshOutcome, GatewayError>> + Send + '_ {
        let sequence = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let params = params.clone();

        async move {
            tracing::debug!(sequence, page = params.page(), "refresh issued");

            let page = match self.gateway.list_sets(&params).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::debug!(sequence, error = %e, "refresh failed");
                    return Err(e);
                }
            };

            Ok(self.apply(sequence, page))
        }
    }

    fn apply(&self, sequence: u64, page: SetPage) -> RefreshOutcome {
        let mut outcome = RefreshOutcome::Applied { sequence };

        self.current.send_if_modified(|current| {
            let latest = self.issued.load(Ordering::SeqCst);
            if sequence != latest {
                outcome = RefreshOutcome::Superseded { sequence, latest };
                return false;
            }
            *current = Arc::new(page);
            true
        });

        match outcome {
            RefreshOutcome::Applied { .. } => {
                tracing::debug!(sequence, "refresh applied");
            }
            RefreshOutcome::Superseded { latest, .. } => {
                tracing::debug!(sequence, latest, "discarding superseded refresh");
            }
        }
        outcome
    }
}

impl std::fmt::Debug for SetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetStore")
            .field("issued", &self.latest_issued())
            .field("items", &self.current().items.len())
            .finish_non_exhaustive()
    }
}
