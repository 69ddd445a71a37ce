//! Query lifecycle shared with whatever renders the forecast.
//!
//! Every query moves `Idle → Requesting → Success | Failed`. Queries are never
//! cancelled, so two of them can be in flight at once; [`RacePolicy`] decides
//! whether a result that resolves after a newer query was issued still lands.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{
    error::{ConfigurationError, FetchError},
    fetcher::ForecastSource,
    model::{LocationQuery, NormalizedForecast},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RacePolicy {
    /// Results from superseded queries are dropped.
    #[default]
    LastIssuedWins,
    /// Whatever resolves last is shown, even if it was issued first.
    LastResolvedWins,
}

impl RacePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RacePolicy::LastIssuedWins => "last_issued_wins",
            RacePolicy::LastResolvedWins => "last_resolved_wins",
        }
    }
}

impl TryFrom<&str> for RacePolicy {
    type Error = ConfigurationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().replace('-', "_").as_str() {
            "last_issued_wins" => Ok(RacePolicy::LastIssuedWins),
            "last_resolved_wins" => Ok(RacePolicy::LastResolvedWins),
            _ => Err(ConfigurationError::UnknownRacePolicy(value.to_string())),
        }
    }
}

/// Why a query ended in "no results". For logs and tests, not for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    InvalidResponse,
}

impl From<&FetchError> for FailureKind {
    fn from(err: &FetchError) -> Self {
        match err {
            FetchError::Network(_) => FailureKind::Network,
            FetchError::InvalidResponse(_) => FailureKind::InvalidResponse,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum QueryState {
    #[default]
    Idle,
    Requesting {
        generation: u64,
    },
    Success(NormalizedForecast),
    Failed(FailureKind),
}

impl QueryState {
    pub fn has_no_results(&self) -> bool {
        matches!(self, QueryState::Failed(_))
    }

    pub fn forecast(&self) -> Option<&NormalizedForecast> {
        match self {
            QueryState::Success(forecast) => Some(forecast),
            _ => None,
        }
    }
}

/// Handed out by [`ForecastSession::begin`]; identifies one issued query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTicket {
    generation: u64,
}

impl QueryTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug)]
pub struct ForecastSession {
    source: Arc<dyn ForecastSource>,
    policy: RacePolicy,
    latest: AtomicU64,
    state: watch::Sender<QueryState>,
}

impl ForecastSession {
    pub fn new(source: Arc<dyn ForecastSource>, policy: RacePolicy) -> Self {
        let (state, _) = watch::channel(QueryState::Idle);
        Self { source, policy, latest: AtomicU64::new(0), state }
    }

    pub fn policy(&self) -> RacePolicy {
        self.policy
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> QueryState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState> {
        self.state.subscribe()
    }

    /// Register a new query and publish `Requesting`.
    pub fn begin(&self) -> QueryTicket {
        let mut generation = 0;
        // Bumped under the channel lock so `finish` never sees a half-issued query.
        self.state.send_modify(|state| {
            generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
            *state = QueryState::Requesting { generation };
        });
        QueryTicket { generation }
    }

    /// Publish the outcome of `ticket`. Returns `false` when the result was
    /// discarded because a newer query has been issued since.
    pub fn finish(
        &self,
        ticket: QueryTicket,
        result: Result<NormalizedForecast, FetchError>,
    ) -> bool {
        let (next, error) = match result {
            Ok(forecast) => (QueryState::Success(forecast), None),
            Err(err) => (QueryState::Failed(FailureKind::from(&err)), Some(err)),
        };

        let applied = self.state.send_if_modified(|state| {
            if self.policy == RacePolicy::LastIssuedWins
                && ticket.generation != self.latest.load(Ordering::SeqCst)
            {
                return false;
            }
            *state = next;
            true
        });

        if !applied {
            debug!(generation = ticket.generation, "discarding superseded result");
        } else if let Some(err) = error {
            warn!(generation = ticket.generation, error = %err, "no results");
        }
        applied
    }

    /// Run one query to completion and publish its outcome.
    pub async fn search(&self, query: &LocationQuery) -> QueryState {
        let ticket = self.begin();
        let result = self.source.fetch_forecast(query).await;
        self.finish(ticket, result);
        self.state()
    }
}
