use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Opaque identifier of a user, as assigned by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create from any string-like identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A leaderboard participant.
///
/// `points` is authoritative from the remote service and never computed
/// locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identifier. Accepts the `_id` key used by document stores.
    #[serde(alias = "_id")]
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Total points.
    #[serde(default)]
    pub points: u64,
    /// Profile picture URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
}

impl User {
    /// Returns the profile picture if one is set and non-empty.
    pub fn profile_pic(&self) -> Option<&str> {
        self.profile_pic.as_deref().filter(|pic| !pic.is_empty())
    }
}

/// An immutable entry of the claim ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRecord {
    /// Identifier.
    #[serde(alias = "_id")]
    pub id: String,
    /// The user the points were awarded to.
    pub user_id: UserId,
    /// Snapshot of the user name at claim time.
    pub user_name: String,
    /// Points awarded in this event.
    pub points: u64,
    /// When the claim happened.
    #[serde(with = "timestamp")]
    pub timestamp: OffsetDateTime,
}

/// Body of a user creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    /// Display name.
    pub name: String,
}

/// Body of a claim request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    /// The user to award points to.
    pub user_id: UserId,
}

/// Response of a claim request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    /// Points chosen by the service.
    pub awarded_points: u64,
}

/// RFC 3339 on the way out; RFC 3339 or epoch milliseconds on the way in.
mod timestamp {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use time::{format_description::well_known::Rfc3339, OffsetDateTime};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Millis(i64),
    }

    pub(super) fn serialize<S: Serializer>(
        ts: &OffsetDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        time::serde::rfc3339::serialize(ts, serializer)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<OffsetDateTime, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => OffsetDateTime::parse(&text, &Rfc3339).map_err(de::Error::custom),
            Raw::Millis(millis) => {
                OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
                    .map_err(de::Error::custom)
            }
        }
    }
}
