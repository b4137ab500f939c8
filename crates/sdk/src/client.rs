use std::{sync::Arc, time::Duration};

use typed_builder::TypedBuilder;

use crate::{
    claim::{ClaimOrchestrator, DEFAULT_AWARD_DISPLAY},
    ledger::LedgerStore,
    model::ClaimRecord,
    ranking::{rank, Ranking},
    roster::RosterStore,
    service::LeaderboardService,
};

/// Options for [`Leaderboard`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct LeaderboardOptions {
    /// How long an award stays visible.
    #[builder(default = DEFAULT_AWARD_DISPLAY)]
    pub award_display: Duration,
    /// Per-request timeout of the HTTP service.
    #[builder(default, setter(strip_option))]
    pub request_timeout: Option<Duration>,
}

impl Default for LeaderboardOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// The leaderboard components wired to one service.
#[derive(Debug)]
pub struct Leaderboard<S> {
    service: Arc<S>,
    roster: Arc<RosterStore<S>>,
    ledger: Arc<LedgerStore<S>>,
    claims: ClaimOrchestrator<S>,
}

impl<S> Leaderboard<S> {
    /// Create with default options.
    pub fn new(service: S) -> Self {
        Self::new_with_options(service, &LeaderboardOptions::default())
    }

    /// Create with options.
    pub fn new_with_options(service: S, options: &LeaderboardOptions) -> Self {
        let service = Arc::new(service);
        let roster = Arc::new(RosterStore::new(service.clone()));
        let ledger = Arc::new(LedgerStore::new(service.clone()));
        let claims = ClaimOrchestrator::new(service.clone(), roster.clone(), ledger.clone())
            .with_award_display(options.award_display);
        Self {
            service,
            roster,
            ledger,
            claims,
        }
    }

    /// Get the service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Get the roster store.
    pub fn roster(&self) -> &RosterStore<S> {
        &self.roster
    }

    /// Get the ledger store.
    pub fn ledger(&self) -> &LedgerStore<S> {
        &self.ledger
    }

    /// Get the claim orchestrator.
    pub fn claims(&self) -> &ClaimOrchestrator<S> {
        &self.claims
    }

    /// Rank the current roster snapshot.
    pub fn ranking(&self) -> Ranking {
        rank(&self.roster.snapshot())
    }

    /// Get the claim history, most recent first.
    pub fn history(&self) -> Vec<ClaimRecord> {
        self.ledger.chronological()
    }
}

impl<S: LeaderboardService> Leaderboard<S> {
    /// Load both stores.
    ///
    /// Both fetches run to completion; the first error is returned.
    pub async fn load(&self) -> crate::Result<()> {
        let (roster, ledger) = tokio::join!(self.roster.refresh(), self.ledger.refresh());
        roster?;
        ledger?;
        Ok(())
    }

    /// Create a user and refresh the roster.
    pub async fn add_user(&self, name: &str) -> crate::Result<()> {
        self.roster.add_user(name).await
    }
}

#[cfg(feature = "http")]
impl Leaderboard<crate::service::HttpService> {
    /// Create a leaderboard backed by the HTTP service at `base_url`.
    pub fn connect(base_url: &str, options: &LeaderboardOptions) -> crate::Result<Self> {
        let service =
            crate::service::HttpService::try_new_with_timeout(base_url, options.request_timeout)?;
        Ok(Self::new_with_options(service, options))
    }
}
