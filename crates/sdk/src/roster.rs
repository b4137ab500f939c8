use std::sync::Arc;

use crate::{
    model::{User, UserId},
    service::LeaderboardService,
    snapshot::SnapshotCell,
};

/// Holds the last fetched set of users.
///
/// The snapshot keeps the order the service returned and is replaced as a
/// whole on every successful refresh. When two refreshes overlap, whichever
/// response arrives last wins, even if its request was issued first.
#[derive(Debug)]
pub struct RosterStore<S> {
    service: Arc<S>,
    snapshot: SnapshotCell<User>,
}

impl<S> RosterStore<S> {
    /// Create an empty store.
    pub fn new(service: Arc<S>) -> Self {
        Self {
            service,
            snapshot: Default::default(),
        }
    }

    /// Get the current snapshot.
    pub fn snapshot(&self) -> Arc<[User]> {
        self.snapshot.get()
    }

    /// Returns whether a refresh has ever succeeded.
    pub fn is_loaded(&self) -> bool {
        self.snapshot.is_loaded()
    }

    /// Find a user in the current snapshot.
    pub fn find(&self, id: &UserId) -> Option<User> {
        self.snapshot().iter().find(|user| user.id == *id).cloned()
    }

    /// Number of users in the current snapshot.
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Returns whether the current snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: LeaderboardService> RosterStore<S> {
    /// Fetch the users and replace the snapshot.
    ///
    /// On failure the previous snapshot is kept and the error is returned.
    pub async fn refresh(&self) -> crate::Result<()> {
        let users = self.service.users().await?;
        tracing::debug!(users = users.len(), "roster refreshed");
        self.snapshot.replace(users);
        Ok(())
    }

    /// Create a user, then refresh.
    ///
    /// The name is trimmed first; a blank name is rejected without
    /// contacting the service.
    pub async fn add_user(&self, name: &str) -> crate::Result<()> {
        let name = validate_name(name)?;
        self.service.create_user(name).await?;
        tracing::info!(%name, "user created");
        self.refresh().await
    }
}

/// Trim and validate a user name.
pub fn validate_name(name: &str) -> crate::Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(crate::Error::Validation("user name must not be empty"));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::service::MemoryService;

    use super::*;

    #[tokio::test]
    async fn refresh_replaces_snapshot_in_source_order() -> crate::Result<()> {
        let service = Arc::new(MemoryService::with_points([("Al", 10), ("Bo", 30)]));
        let roster = RosterStore::new(service.clone());
        assert!(!roster.is_loaded());
        assert!(roster.is_empty());

        roster.refresh().await?;
        assert!(roster.is_loaded());
        let names = roster
            .snapshot()
            .iter()
            .map(|user| user.name.clone())
            .collect::<Vec<_>>();
        assert_eq!(names, ["Al", "Bo"]);

        service.remove_user(&UserId::from("1"));
        roster.refresh().await?;
        assert_eq!(roster.len(), 1);
        assert!(roster.find(&UserId::from("1")).is_none());
        Ok(())
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_snapshot() -> crate::Result<()> {
        let service = Arc::new(MemoryService::with_points([("Al", 10)]));
        let roster = RosterStore::new(service.clone());
        roster.refresh().await?;
        let before = roster.snapshot();

        service.set_offline(true);
        let err = roster.refresh().await.unwrap_err();
        assert!(err.is_transport());
        assert!(Arc::ptr_eq(&before, &roster.snapshot()));
        Ok(())
    }

    #[tokio::test]
    async fn add_user_trims_and_refreshes() -> crate::Result<()> {
        let service = Arc::new(MemoryService::default());
        let roster = RosterStore::new(service.clone());
        roster.add_user("  Cy ").await?;
        let snapshot = roster.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].name, "Cy");
        assert_eq!(snapshot[0].points, 0);
        Ok(())
    }

    #[tokio::test]
    async fn blank_name_never_reaches_the_service() {
        let service = Arc::new(MemoryService::default());
        let roster = RosterStore::new(service.clone());
        let err = roster.add_user("   ").await.unwrap_err();
        assert!(matches!(err, crate::Error::Validation(_)));
        assert_eq!(service.fetch_calls(), 0);
        assert!(!roster.is_loaded());
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_refreshes_last_arrival_wins() -> crate::Result<()> {
        // The first fetch is slow, the second fast: the earlier request
        // answers last.
        let service = Arc::new(
            MemoryService::with_points([("Al", 10)])
                .with_fetch_delays([Duration::from_millis(150), Duration::from_millis(50)]),
        );
        let roster = RosterStore::new(service.clone());

        let first = roster.refresh();
        let second = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            service.remove_user(&UserId::from("1"));
            roster.refresh().await?;
            assert!(roster.is_empty());
            Ok::<_, crate::Error>(())
        };
        let (first, second) = tokio::join!(first, second);
        first?;
        second?;

        assert_eq!(roster.len(), 1);
        assert!(roster.find(&UserId::from("1")).is_some());
        Ok(())
    }
}
