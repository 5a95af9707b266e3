use reqwest::header::COOKIE;

use crate::common::{HistoryMessage, RecentChat, UserId};

use super::error::ClientError;
use super::transport::ServerEndpoint;

/// Thin wrapper over the server's JSON endpoints.
#[derive(Debug, Clone)]
pub struct ChatApi {
    http: reqwest::Client,
    endpoint: ServerEndpoint,
}

impl ChatApi {
    pub fn new(endpoint: ServerEndpoint) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
        }
    }

    /// `GET /messages/{other}`, oldest first.
    pub async fn fetch_history(&self, other: UserId) -> Result<Vec<HistoryMessage>, ClientError> {
        self.get_json(&format!("/messages/{other}")).await
    }

    /// `GET /recent_chats`, newest conversation first.
    pub async fn fetch_recents(&self) -> Result<Vec<RecentChat>, ClientError> {
        self.get_json("/recent_chats").await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.endpoint.api_url(path)?;
        log::debug!("GET {url}");

        let mut request = self.http.get(url);
        if let Some(cookie) = &self.endpoint.session_cookie {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}
