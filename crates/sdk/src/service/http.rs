use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::{
    error::TransportError,
    model::{ClaimRecord, ClaimRequest, ClaimResponse, NewUser, User, UserId},
};

use super::LeaderboardService;

const BODY_SNIPPET_LEN: usize = 1024;

/// Leaderboard service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpService {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpService {
    /// Create a service client for the given API root, e.g. `http://localhost:5000/api`.
    pub fn try_new(base_url: &str) -> crate::Result<Self> {
        Self::try_new_with_timeout(base_url, None)
    }

    /// Create a service client with an optional per-request timeout.
    pub fn try_new_with_timeout(base_url: &str, timeout: Option<Duration>) -> crate::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self::new_with_client(base_url, builder.build()?)
    }

    /// Create a service client using the given reqwest client.
    pub fn new_with_client(base_url: &str, http: reqwest::Client) -> crate::Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        // `Url::join` replaces the last segment unless the path ends with a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { base_url, http })
    }

    /// Get the API root.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> crate::Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn read<T: DeserializeOwned>(resp: reqwest::Response) -> crate::Result<T> {
        let text = Self::read_text(resp).await?;
        serde_json::from_str(&text).map_err(|err| {
            TransportError::Decode {
                message: err.to_string(),
                body: snippet(&text),
            }
            .into()
        })
    }

    async fn read_text(resp: reqwest::Response) -> crate::Result<String> {
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: snippet(&text),
            }
            .into());
        }
        Ok(text)
    }
}

fn snippet(text: &str) -> String {
    text.chars().take(BODY_SNIPPET_LEN).collect()
}

impl LeaderboardService for HttpService {
    async fn users(&self) -> crate::Result<Vec<User>> {
        let url = self.endpoint("users")?;
        let resp = self.http.get(url).send().await?;
        Self::read(resp).await
    }

    async fn create_user(&self, name: &str) -> crate::Result<()> {
        let url = self.endpoint("users")?;
        let resp = self
            .http
            .post(url)
            .json(&NewUser {
                name: name.to_string(),
            })
            .send()
            .await?;
        Self::read_text(resp).await?;
        Ok(())
    }

    async fn claim(&self, user: &UserId) -> crate::Result<ClaimResponse> {
        let url = self.endpoint("claim")?;
        let resp = self
            .http
            .post(url)
            .json(&ClaimRequest {
                user_id: user.clone(),
            })
            .send()
            .await?;
        Self::read(resp).await
    }

    async fn history(&self) -> crate::Result<Vec<ClaimRecord>> {
        let url = self.endpoint("history")?;
        let resp = self.http.get(url).send().await?;
        Self::read(resp).await
    }
}
