use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use utoipa::ToSchema;

use super::client::{DiscoveryClient, DiscoveryError, ErrorKind};
use super::models::DiscoveryResponse;
use super::validation::SearchQuery;
use crate::presentation::ResultsView;

/// Identifies one issued search. Later searches get strictly larger tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct SearchTicket {
    pub token: u64,
}

/// How a settled search ended
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SearchOutcome {
    /// Includes the empty result set
    Results { results: ResultsView },
    Error { error: ErrorKind, message: String },
}

/// What the search view currently displays
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SearchView {
    Idle,
    Loading {
        token: u64,
        query: String,
    },
    Settled {
        token: u64,
        query: String,
        outcome: SearchOutcome,
    },
}

impl SearchView {
    pub fn token(&self) -> Option<u64> {
        match self {
            SearchView::Idle => None,
            SearchView::Loading { token, .. } | SearchView::Settled { token, .. } => Some(*token),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SearchView::Loading { .. })
    }
}

/// Search state of one view: idle, loading or settled.
///
/// Overlapping searches are neither queued nor cancelled, but only the most
/// recently issued search may change what the view shows. Queries are
/// validated before a search is issued, so a rejected query never touches it.
pub struct SearchSession {
    latest: AtomicU64,
    view: watch::Sender<SearchView>,
    fallback_photo: String,
}

impl SearchSession {
    pub fn new(fallback_photo: impl Into<String>) -> Self {
        let (view, _) = watch::channel(SearchView::Idle);
        Self {
            latest: AtomicU64::new(0),
            view,
            fallback_photo: fallback_photo.into(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchView> {
        self.view.subscribe()
    }

    pub fn current(&self) -> SearchView {
        self.view.borrow().clone()
    }

    fn is_latest(&self, token: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == token
    }

    /// Issue a new token and show the loading state
    pub fn begin(&self, query: &str) -> SearchTicket {
        let token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.view.send_if_modified(|view| {
            // A newer search may have been issued before we got the lock
            if !self.is_latest(token) {
                return false;
            }
            *view = SearchView::Loading {
                token,
                query: query.to_string(),
            };
            true
        });
        tracing::debug!(token, "Search started");
        SearchTicket { token }
    }

    /// Apply a result if `ticket` is still the latest search.
    /// Returns whether the view changed.
    pub fn settle(
        &self,
        ticket: SearchTicket,
        result: &Result<DiscoveryResponse, DiscoveryError>,
    ) -> bool {
        let applied = self.view.send_if_modified(|view| {
            if !self.is_latest(ticket.token) {
                return false;
            }
            let query = match view {
                SearchView::Loading { query, .. } => query.clone(),
                _ => String::new(),
            };
            *view = SearchView::Settled {
                token: ticket.token,
                query,
                outcome: self.outcome(result),
            };
            true
        });

        if applied {
            tracing::debug!(token = ticket.token, "Search settled");
        } else {
            tracing::debug!(
                token = ticket.token,
                latest = self.latest.load(Ordering::SeqCst),
                "Discarding stale search result"
            );
        }
        applied
    }

    /// Return to idle. Anything still in flight becomes stale.
    pub fn reset(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
        self.view.send_replace(SearchView::Idle);
    }

    /// Start a search in the background and return its ticket immediately
    pub fn spawn_search(
        self: &Arc<Self>,
        client: Arc<DiscoveryClient>,
        query: SearchQuery,
    ) -> SearchTicket {
        let ticket = self.begin(query.as_str());
        let session = Arc::clone(self);
        tokio::spawn(async move {
            let result = client.discover_validated(&query).await;
            session.settle(ticket, &result);
        });
        ticket
    }

    fn outcome(&self, result: &Result<DiscoveryResponse, DiscoveryError>) -> SearchOutcome {
        match result {
            Ok(response) => SearchOutcome::Results {
                results: ResultsView::from_response(response, &self.fallback_photo),
            },
            Err(e) => SearchOutcome::Error {
                error: e.kind(),
                message: e.user_message(),
            },
        }
    }
}
