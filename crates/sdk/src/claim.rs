use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};

use tokio::task::JoinHandle;

use crate::{
    ledger::LedgerStore,
    model::{User, UserId},
    roster::RosterStore,
    service::LeaderboardService,
};

/// Default lifetime of the award acknowledgment.
pub const DEFAULT_AWARD_DISPLAY: Duration = Duration::from_millis(2000);

/// Observable state of the claim workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimState {
    /// Nothing selected.
    Idle,
    /// A user is selected and can be claimed for.
    Selected(User),
    /// A claim for the user is in flight.
    Claiming(User),
    /// Points were just awarded and nothing new is selected.
    Awarded {
        /// Points awarded.
        points: u64,
        /// The user the points went to.
        user: User,
    },
}

/// A successful claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Award {
    /// The user the points went to, as selected when claiming.
    pub user: User,
    /// Points chosen by the service.
    pub points: u64,
}

#[derive(Debug, Default)]
struct Selection {
    selected: Option<User>,
    in_flight: Option<User>,
}

#[derive(Debug, Default)]
struct AwardSlot {
    award: Option<Award>,
    generation: u64,
}

/// Owns the selection and drives claims.
///
/// At most one claim is in flight at a time. After a successful claim the
/// selection is cleared, both stores are refreshed and an [`Award`] stays
/// visible for the award display duration. That timer is not affected by
/// later selections; a newer award restarts it.
#[derive(Debug)]
pub struct ClaimOrchestrator<S> {
    service: Arc<S>,
    roster: Arc<RosterStore<S>>,
    ledger: Arc<LedgerStore<S>>,
    selection: Mutex<Selection>,
    award: Arc<Mutex<AwardSlot>>,
    timer: Mutex<Option<JoinHandle<()>>>,
    award_display: Duration,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears the in-flight marker when the claim ends, however it ends.
struct InFlight<'a> {
    selection: &'a Mutex<Selection>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock(self.selection).in_flight = None;
    }
}

impl<S> ClaimOrchestrator<S> {
    /// Create an orchestrator over the given stores.
    pub fn new(service: Arc<S>, roster: Arc<RosterStore<S>>, ledger: Arc<LedgerStore<S>>) -> Self {
        Self {
            service,
            roster,
            ledger,
            selection: Default::default(),
            award: Default::default(),
            timer: Default::default(),
            award_display: DEFAULT_AWARD_DISPLAY,
        }
    }

    /// Set how long an award stays visible.
    pub fn with_award_display(mut self, award_display: Duration) -> Self {
        self.award_display = award_display;
        self
    }

    /// Get the award display duration.
    pub fn award_display(&self) -> Duration {
        self.award_display
    }

    /// Select a user from the current roster snapshot.
    ///
    /// Selecting the selected user again deselects it. Returns the new
    /// selection.
    pub fn select(&self, id: &UserId) -> crate::Result<Option<User>> {
        let user = self
            .roster
            .find(id)
            .ok_or_else(|| crate::Error::UnknownUser(id.clone()))?;
        let mut selection = lock(&self.selection);
        let toggled_off = selection
            .selected
            .as_ref()
            .is_some_and(|selected| selected.id == user.id);
        selection.selected = if toggled_off { None } else { Some(user) };
        tracing::debug!(selected = ?selection.selected.as_ref().map(|u| &u.id), "selection changed");
        Ok(selection.selected.clone())
    }

    /// Clear the selection.
    pub fn deselect(&self) {
        lock(&self.selection).selected = None;
    }

    /// Get the selected user, as found in the current roster snapshot.
    ///
    /// A selection whose user is no longer in the roster is dropped.
    pub fn selected(&self) -> Option<User> {
        self.reconcile();
        lock(&self.selection).selected.clone()
    }

    /// Returns whether a claim can be issued now.
    pub fn can_claim(&self) -> bool {
        let mut selection = lock(&self.selection);
        self.reconcile_locked(&mut selection);
        selection.selected.is_some() && selection.in_flight.is_none()
    }

    /// Returns whether a claim is in flight.
    pub fn is_claiming(&self) -> bool {
        lock(&self.selection).in_flight.is_some()
    }

    /// Get the award currently acknowledged, if its display window is open.
    pub fn awarded(&self) -> Option<Award> {
        lock(&self.award).award.clone()
    }

    /// Get the current state.
    pub fn state(&self) -> ClaimState {
        let selected = self.selected();
        let selection = lock(&self.selection);
        if let Some(user) = &selection.in_flight {
            return ClaimState::Claiming(user.clone());
        }
        if let Some(user) = selected {
            return ClaimState::Selected(user);
        }
        drop(selection);
        match self.awarded() {
            Some(Award { user, points }) => ClaimState::Awarded { points, user },
            None => ClaimState::Idle,
        }
    }

    /// Drop the selection and the award, cancelling the award timer.
    ///
    /// A claim already in flight still completes.
    pub fn reset(&self) {
        if let Some(timer) = lock(&self.timer).take() {
            timer.abort();
        }
        lock(&self.award).award = None;
        self.deselect();
    }

    fn reconcile(&self) {
        self.reconcile_locked(&mut lock(&self.selection));
    }

    fn reconcile_locked(&self, selection: &mut Selection) {
        let Some(selected) = selection.selected.as_ref() else {
            return;
        };
        match self.roster.find(&selected.id) {
            Some(current) => selection.selected = Some(current),
            None => {
                tracing::debug!(user = %selected.id, "selected user left the roster");
                selection.selected = None;
            }
        }
    }

    fn show_award(&self, award: Award) {
        let generation = {
            let mut slot = lock(&self.award);
            slot.generation += 1;
            slot.award = Some(award);
            slot.generation
        };
        let slot = Arc::downgrade(&self.award);
        let display = self.award_display;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(display).await;
            expire_award(&slot, generation);
        });
        if let Some(previous) = lock(&self.timer).replace(timer) {
            previous.abort();
        }
    }
}

fn expire_award(slot: &Weak<Mutex<AwardSlot>>, generation: u64) {
    let Some(slot) = slot.upgrade() else {
        return;
    };
    let mut slot = lock(&slot);
    if slot.generation == generation {
        slot.award = None;
    }
}

impl<S: LeaderboardService> ClaimOrchestrator<S> {
    /// Claim points for the selected user.
    ///
    /// Returns `Ok(None)` without contacting the service when nothing is
    /// selected or the selected user left the roster, and [`Error::Concurrency`](crate::Error::Concurrency) while
    /// another claim is in flight. A failed claim keeps the selection and is
    /// reported as [`Error::Claim`](crate::Error::Claim). If the claim
    /// succeeds but a refresh afterwards fails, the award is still shown and
    /// the refresh error is returned.
    pub async fn claim(&self) -> crate::Result<Option<Award>> {
        let user = {
            let mut selection = lock(&self.selection);
            if selection.in_flight.is_some() {
                tracing::warn!("claim rejected: another claim is in flight");
                return Err(crate::Error::Concurrency);
            }
            self.reconcile_locked(&mut selection);
            let Some(user) = selection.selected.clone() else {
                return Ok(None);
            };
            selection.in_flight = Some(user.clone());
            user
        };
        let in_flight = InFlight {
            selection: &self.selection,
        };

        tracing::info!(user = %user.id, "dispatching claim");
        let response = match self.service.claim(&user.id).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(user = %user.id, %err, "claim failed");
                return Err(err.into_claim_error(user.id));
            }
        };

        let award = Award {
            user,
            points: response.awarded_points,
        };
        tracing::info!(user = %award.user.id, points = award.points, "points awarded");
        lock(&self.selection).selected = None;
        drop(in_flight);
        self.show_award(award.clone());

        let (roster, ledger) = tokio::join!(self.roster.refresh(), self.ledger.refresh());
        if let Err(err) = roster.as_ref().and(ledger.as_ref()) {
            tracing::warn!(%err, "refresh after claim failed");
        }
        roster?;
        ledger?;
        Ok(Some(award))
    }
}

impl<S> Drop for ClaimOrchestrator<S> {
    fn drop(&mut self) {
        if let Some(timer) = lock(&self.timer).take() {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{service::MemoryService, utils::test::setup_fmt_tracing};

    use super::*;

    fn setup(service: MemoryService) -> (Arc<MemoryService>, ClaimOrchestrator<MemoryService>) {
        let service = Arc::new(service);
        let roster = Arc::new(RosterStore::new(service.clone()));
        let ledger = Arc::new(LedgerStore::new(service.clone()));
        let orchestrator = ClaimOrchestrator::new(service.clone(), roster, ledger);
        (service, orchestrator)
    }

    async fn loaded(service: MemoryService) -> (Arc<MemoryService>, ClaimOrchestrator<MemoryService>) {
        let (service, orchestrator) = setup(service);
        orchestrator
            .roster
            .refresh()
            .await
            .expect("roster must load");
        (service, orchestrator)
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    fn id(id: &str) -> UserId {
        UserId::from(id)
    }

    #[tokio::test]
    async fn selection_toggles_and_replaces() -> crate::Result<()> {
        let (_, orchestrator) = loaded(MemoryService::with_points([("A", 1), ("B", 2)])).await;
        assert_eq!(orchestrator.state(), ClaimState::Idle);

        let a = orchestrator.select(&id("1"))?.expect("selected");
        assert_eq!(orchestrator.state(), ClaimState::Selected(a));
        assert_eq!(orchestrator.select(&id("1"))?, None);
        assert_eq!(orchestrator.state(), ClaimState::Idle);

        orchestrator.select(&id("1"))?;
        let b = orchestrator.select(&id("2"))?.expect("selected");
        assert_eq!(b.name, "B");
        assert_eq!(orchestrator.state(), ClaimState::Selected(b));

        assert!(matches!(
            orchestrator.select(&id("9")),
            Err(crate::Error::UnknownUser(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn claim_without_selection_is_a_no_op() -> crate::Result<()> {
        let (service, orchestrator) = loaded(MemoryService::with_points([("A", 1)])).await;
        assert!(!orchestrator.can_claim());
        assert_eq!(orchestrator.claim().await?, None);
        assert_eq!(service.claim_calls(), 0);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn award_expires_without_interaction() -> crate::Result<()> {
        let _tracing = setup_fmt_tracing("debug");
        let (service, orchestrator) = loaded(
            MemoryService::with_points([("Al", 10), ("Bo", 30)]).with_awards(vec![7]),
        )
        .await;

        orchestrator.select(&id("1"))?;
        let award = orchestrator.claim().await?.expect("awarded");
        assert_eq!(award.points, 7);
        assert_eq!(award.user.name, "Al");
        assert_eq!(service.claim_calls(), 1);

        assert_eq!(orchestrator.selected(), None);
        assert!(matches!(
            orchestrator.state(),
            ClaimState::Awarded { points: 7, .. }
        ));
        assert_eq!(
            orchestrator.roster.find(&id("1")).map(|u| u.points),
            Some(17)
        );
        let ledger = orchestrator.ledger.chronological();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].points, 7);

        tokio::time::sleep(Duration::from_millis(1999)).await;
        settle().await;
        assert!(orchestrator.awarded().is_some());

        tokio::time::sleep(Duration::from_millis(2)).await;
        settle().await;
        assert_eq!(orchestrator.awarded(), None);
        assert_eq!(orchestrator.state(), ClaimState::Idle);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn one_claim_in_flight_at_a_time() -> crate::Result<()> {
        let (service, orchestrator) = loaded(
            MemoryService::with_points([("A", 1), ("B", 2)]).with_delay(Duration::from_millis(100)),
        )
        .await;
        orchestrator.select(&id("1"))?;

        let second = async {
            settle().await;
            assert!(orchestrator.is_claiming());
            assert!(!orchestrator.can_claim());
            assert!(matches!(orchestrator.state(), ClaimState::Claiming(_)));
            orchestrator.select(&id("2"))?;
            orchestrator.claim().await
        };
        let (first, second) = tokio::join!(orchestrator.claim(), second);

        assert!(first?.is_some());
        assert!(matches!(second, Err(crate::Error::Concurrency)));
        assert_eq!(service.claim_calls(), 1);
        assert!(!orchestrator.is_claiming());
        Ok(())
    }

    #[tokio::test]
    async fn failed_claim_keeps_selection() -> crate::Result<()> {
        let (service, orchestrator) = loaded(MemoryService::with_points([("A", 1)])).await;
        let a = orchestrator.select(&id("1"))?.expect("selected");

        service.fail_next_claim();
        let err = orchestrator.claim().await.unwrap_err();
        assert!(matches!(err, crate::Error::Claim { ref user, .. } if *user == id("1")));
        assert!(err.is_transport());
        assert_eq!(orchestrator.state(), ClaimState::Selected(a));
        assert!(orchestrator.can_claim());
        assert_eq!(orchestrator.awarded(), None);

        assert!(orchestrator.claim().await?.is_some());
        assert_eq!(service.claim_calls(), 2);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_claim_releases_in_flight_marker() -> crate::Result<()> {
        let (_, orchestrator) = loaded(
            MemoryService::with_points([("A", 1)]).with_delay(Duration::from_millis(100)),
        )
        .await;
        orchestrator.select(&id("1"))?;

        let timed_out =
            tokio::time::timeout(Duration::from_millis(10), orchestrator.claim()).await;
        assert!(timed_out.is_err());
        assert!(!orchestrator.is_claiming());
        assert!(orchestrator.can_claim());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn new_selection_does_not_cancel_award_timer() -> crate::Result<()> {
        let (_, orchestrator) = loaded(MemoryService::with_points([("A", 1), ("B", 2)])).await;
        orchestrator.select(&id("1"))?;
        orchestrator.claim().await?;

        tokio::time::sleep(Duration::from_millis(1000)).await;
        let b = orchestrator.select(&id("2"))?.expect("selected");
        assert_eq!(orchestrator.state(), ClaimState::Selected(b.clone()));
        assert!(orchestrator.awarded().is_some());

        tokio::time::sleep(Duration::from_millis(1001)).await;
        settle().await;
        assert_eq!(orchestrator.awarded(), None);
        assert_eq!(orchestrator.state(), ClaimState::Selected(b));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn newer_award_restarts_the_window() -> crate::Result<()> {
        let (_, orchestrator) = loaded(
            MemoryService::with_points([("A", 1)]).with_awards(vec![3, 5]),
        )
        .await;
        orchestrator.select(&id("1"))?;
        orchestrator.claim().await?;

        tokio::time::sleep(Duration::from_millis(1500)).await;
        orchestrator.select(&id("1"))?;
        orchestrator.claim().await?;

        tokio::time::sleep(Duration::from_millis(600)).await;
        settle().await;
        assert_eq!(orchestrator.awarded().map(|a| a.points), Some(5));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        settle().await;
        assert_eq!(orchestrator.awarded(), None);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn reset_and_drop_cancel_the_timer() -> crate::Result<()> {
        let (_, orchestrator) = loaded(MemoryService::with_points([("A", 1)])).await;
        orchestrator.select(&id("1"))?;
        orchestrator.claim().await?;
        orchestrator.reset();
        assert_eq!(orchestrator.awarded(), None);
        assert_eq!(orchestrator.state(), ClaimState::Idle);

        orchestrator.select(&id("1"))?;
        orchestrator.claim().await?;
        drop(orchestrator);
        tokio::time::sleep(Duration::from_millis(2500)).await;
        settle().await;
        Ok(())
    }

    #[tokio::test]
    async fn selection_follows_roster_refreshes() -> crate::Result<()> {
        let (service, orchestrator) = loaded(MemoryService::with_points([("A", 1), ("B", 2)])).await;
        orchestrator.select(&id("2"))?;

        service.claim(&id("2")).await?;
        orchestrator.roster.refresh().await?;
        assert_eq!(orchestrator.selected().map(|u| u.points), Some(9));

        service.remove_user(&id("2"));
        orchestrator.roster.refresh().await?;
        assert_eq!(orchestrator.selected(), None);
        assert_eq!(orchestrator.state(), ClaimState::Idle);
        assert_eq!(orchestrator.claim().await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn departed_user_is_never_claimed() -> crate::Result<()> {
        let (service, orchestrator) = loaded(MemoryService::with_points([("A", 1), ("B", 2)])).await;
        orchestrator.select(&id("2"))?;

        service.remove_user(&id("2"));
        orchestrator.roster.refresh().await?;

        assert!(!orchestrator.can_claim());
        assert_eq!(orchestrator.claim().await?, None);
        assert_eq!(service.claim_calls(), 0);
        assert_eq!(orchestrator.state(), ClaimState::Idle);
        Ok(())
    }

    #[tokio::test]
    async fn claim_uses_refreshed_selection() -> crate::Result<()> {
        let (service, orchestrator) = loaded(MemoryService::with_points([("A", 1)])).await;
        orchestrator.select(&id("1"))?;

        service.claim(&id("1")).await?;
        orchestrator.roster.refresh().await?;

        let award = orchestrator.claim().await?.expect("awarded");
        assert_eq!(award.user.points, 8);
        assert_eq!(service.claim_calls(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn failed_refresh_after_claim_still_shows_award() -> crate::Result<()> {
        let (service, orchestrator) = loaded(MemoryService::with_points([("A", 1)])).await;
        orchestrator.select(&id("1"))?;

        service.set_fetch_failure(true);
        let err = orchestrator.claim().await.unwrap_err();
        assert!(matches!(err, crate::Error::Transport(_)));
        assert_eq!(orchestrator.awarded().map(|a| a.points), Some(7));
        assert_eq!(orchestrator.selected(), None);
        assert!(!orchestrator.is_claiming());
        assert_eq!(service.claim_calls(), 1);
        Ok(())
    }
}
