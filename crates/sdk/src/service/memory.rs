use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex, PoisonError,
    },
    time::Duration,
};

use time::OffsetDateTime;

use crate::{
    error::TransportError,
    model::{ClaimRecord, ClaimResponse, User, UserId},
};

use super::LeaderboardService;

/// In-memory leaderboard service.
///
/// Awards cycle through a fixed sequence, ledger timestamps advance one
/// second per claim, and every call can be delayed to hold it in flight.
/// Fetches read the state when the request is issued and answer after the
/// delay; queued fetch delays take precedence, one per fetch in issue order.
#[derive(Debug)]
pub struct MemoryService {
    state: Mutex<State>,
    delay: Option<Duration>,
    fetch_delays: Mutex<VecDeque<Duration>>,
    fail_next_claim: AtomicBool,
    offline: AtomicBool,
    fetch_failure: AtomicBool,
    claim_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
}

#[derive(Debug)]
struct State {
    users: Vec<User>,
    history: Vec<ClaimRecord>,
    awards: Vec<u64>,
    next_award: usize,
    next_id: u64,
}

impl Default for MemoryService {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl MemoryService {
    /// Create with an initial roster.
    pub fn new(users: Vec<User>) -> Self {
        let next_id = users.len() as u64 + 1;
        Self {
            state: Mutex::new(State {
                users,
                history: Vec::new(),
                awards: vec![7],
                next_award: 0,
                next_id,
            }),
            delay: None,
            fetch_delays: Default::default(),
            fail_next_claim: AtomicBool::new(false),
            offline: AtomicBool::new(false),
            fetch_failure: AtomicBool::new(false),
            claim_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
        }
    }

    /// Create with users built from `(name, points)` pairs, ids `"1"`, `"2"`, ...
    pub fn with_points<'a>(users: impl IntoIterator<Item = (&'a str, u64)>) -> Self {
        Self::new(
            users
                .into_iter()
                .enumerate()
                .map(|(idx, (name, points))| User {
                    id: UserId::new((idx + 1).to_string()),
                    name: name.to_string(),
                    points,
                    profile_pic: None,
                })
                .collect(),
        )
    }

    /// Delay every call by `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Delay the next fetches by the given amounts, in the order they are
    /// issued.
    pub fn with_fetch_delays(self, delays: impl IntoIterator<Item = Duration>) -> Self {
        self.fetch_delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(delays);
        self
    }

    /// Set the award sequence. Empty sequences are ignored.
    pub fn with_awards(self, awards: Vec<u64>) -> Self {
        if !awards.is_empty() {
            self.lock().awards = awards;
        }
        self
    }

    /// Reject the next claim.
    pub fn fail_next_claim(&self) {
        self.fail_next_claim.store(true, Ordering::SeqCst);
    }

    /// Make every call fail with a transport error until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make `users` and `history` fail while mutations keep working.
    pub fn set_fetch_failure(&self, fail: bool) {
        self.fetch_failure.store(fail, Ordering::SeqCst);
    }

    /// Remove a user from the roster.
    pub fn remove_user(&self, id: &UserId) {
        self.lock().users.retain(|user| user.id != *id);
    }

    /// Number of claim requests received.
    pub fn claim_calls(&self) -> usize {
        self.claim_calls.load(Ordering::SeqCst)
    }

    /// Number of `users` and `history` requests received.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn round_trip(&self) -> crate::Result<()> {
        self.round_trip_after(self.delay).await
    }

    async fn round_trip_after(&self, delay: Option<Duration>) -> crate::Result<()> {
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(TransportError::Unavailable("service is offline".to_string()).into());
        }
        Ok(())
    }

    async fn fetch<T>(&self, items: T) -> crate::Result<T> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let queued = self
            .fetch_delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        self.round_trip_after(queued.or(self.delay)).await?;
        if self.fetch_failure.load(Ordering::SeqCst) {
            return Err(TransportError::Status {
                status: 503,
                body: "fetch failed".to_string(),
            }
            .into());
        }
        Ok(items)
    }
}

impl LeaderboardService for MemoryService {
    async fn users(&self) -> crate::Result<Vec<User>> {
        let users = self.lock().users.clone();
        self.fetch(users).await
    }

    async fn create_user(&self, name: &str) -> crate::Result<()> {
        self.round_trip().await?;
        let mut state = self.lock();
        let id = UserId::new(state.next_id.to_string());
        state.next_id += 1;
        state.users.push(User {
            id,
            name: name.to_string(),
            points: 0,
            profile_pic: None,
        });
        Ok(())
    }

    async fn claim(&self, user: &UserId) -> crate::Result<ClaimResponse> {
        self.claim_calls.fetch_add(1, Ordering::SeqCst);
        self.round_trip().await?;
        if self.fail_next_claim.swap(false, Ordering::SeqCst) {
            return Err(TransportError::Status {
                status: 500,
                body: "claim rejected".to_string(),
            }
            .into());
        }
        let mut guard = self.lock();
        let state = &mut *guard;
        let awarded_points = state.awards[state.next_award % state.awards.len()];
        let Some(target) = state.users.iter_mut().find(|u| u.id == *user) else {
            return Err(TransportError::Status {
                status: 404,
                body: format!("user {user} not found"),
            }
            .into());
        };
        state.next_award += 1;
        target.points += awarded_points;
        let user_name = target.name.clone();
        let seq = state.history.len() as i64;
        let timestamp =
            OffsetDateTime::UNIX_EPOCH + time::Duration::days(19_000) + time::Duration::seconds(seq);
        state.history.push(ClaimRecord {
            id: format!("claim-{}", seq + 1),
            user_id: user.clone(),
            user_name,
            points: awarded_points,
            timestamp,
        });
        Ok(ClaimResponse { awarded_points })
    }

    async fn history(&self) -> crate::Result<Vec<ClaimRecord>> {
        let history = self.lock().history.clone();
        self.fetch(history).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_user_does_not_consume_an_award() -> crate::Result<()> {
        let service = MemoryService::with_points([("Al", 0)]).with_awards(vec![3, 5]);
        let err = service.claim(&UserId::from("9")).await.unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Transport(TransportError::Status { status: 404, .. })
        ));
        let response = service.claim(&UserId::from("1")).await?;
        assert_eq!(response.awarded_points, 3);
        assert_eq!(service.claim_calls(), 2);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn queued_fetch_delays_apply_in_issue_order() -> crate::Result<()> {
        let service = MemoryService::with_points([("Al", 0)]).with_fetch_delays([
            Duration::from_millis(30),
            Duration::from_millis(10),
        ]);
        let start = tokio::time::Instant::now();
        let slow = async {
            service.users().await?;
            Ok::<_, crate::Error>(start.elapsed())
        };
        let fast = async {
            service.history().await?;
            Ok::<_, crate::Error>(start.elapsed())
        };
        let (slow, fast) = tokio::join!(slow, fast);
        assert!(fast? < slow?);
        Ok(())
    }
}
