#![deny(missing_docs)]
#![deny(unreachable_pub)]

//! # Leaderboard SDK
//!
//! Ranking, claim ledger and claim workflow over a remote leaderboard
//! service.

/// Error type.
pub mod error;

/// Data model.
pub mod model;

/// Remote service.
pub mod service;

/// Snapshot storage.
pub mod snapshot;

/// Roster store.
pub mod roster;

/// Ledger store.
pub mod ledger;

/// Ranking.
pub mod ranking;

/// Pagination.
pub mod pagination;

/// Claim workflow.
pub mod claim;

/// Avatars.
pub mod avatar;

/// Leaderboard facade.
pub mod client;

/// Constants.
pub mod constants;

#[cfg(test)]
mod utils;

pub use crate::{
    claim::{Award, ClaimOrchestrator, ClaimState},
    client::{Leaderboard, LeaderboardOptions},
    error::{Error, TransportError},
    ledger::LedgerStore,
    model::{ClaimRecord, User, UserId},
    pagination::{Paginator, Window},
    ranking::{rank, Ranking},
    roster::RosterStore,
    service::LeaderboardService,
};

#[cfg(feature = "http")]
pub use crate::service::HttpService;

/// Result type.
pub type Result<T> = std::result::Result<T, Error>;
