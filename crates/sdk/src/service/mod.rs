//! The remote source of truth.
//!
//! The core consumes the service only through [`LeaderboardService`]; every
//! method is a suspension point and nothing else in the crate awaits.

use std::future::Future;

use crate::model::{ClaimRecord, ClaimResponse, User, UserId};

/// HTTP implementation.
#[cfg(feature = "http")]
pub mod http;

/// In-memory implementation.
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

#[cfg(feature = "http")]
pub use self::http::HttpService;

#[cfg(any(test, feature = "test-utils"))]
pub use self::memory::MemoryService;

/// Operations exposed by the leaderboard service.
pub trait LeaderboardService {
    /// `GET /users`.
    fn users(&self) -> impl Future<Output = crate::Result<Vec<User>>>;

    /// `POST /users`. Creates a user with zero points.
    fn create_user(&self, name: &str) -> impl Future<Output = crate::Result<()>>;

    /// `POST /claim`. The service picks the award and appends a ledger entry.
    fn claim(&self, user: &UserId) -> impl Future<Output = crate::Result<ClaimResponse>>;

    /// `GET /history`.
    fn history(&self) -> impl Future<Output = crate::Result<Vec<ClaimRecord>>>;
}

impl<S: LeaderboardService> LeaderboardService for std::sync::Arc<S> {
    fn users(&self) -> impl Future<Output = crate::Result<Vec<User>>> {
        (**self).users()
    }

    fn create_user(&self, name: &str) -> impl Future<Output = crate::Result<()>> {
        (**self).create_user(name)
    }

    fn claim(&self, user: &UserId) -> impl Future<Output = crate::Result<ClaimResponse>> {
        (**self).claim(user)
    }

    fn history(&self) -> impl Future<Output = crate::Result<Vec<ClaimRecord>>> {
        (**self).history()
    }
}
