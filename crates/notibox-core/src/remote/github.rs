//! GitHub implementation of the remote inbox.
//!
//! Talks to the notifications REST API. Thread ids double as the ids
//! used for the read and subscription mutations, which is exactly the
//! id the store tracks.

use reqwest::{Client, Method, RequestBuilder};
use tokio::runtime::Runtime;
use url::Url;

use crate::error::RemoteError;
use crate::model::NotificationItem;
use crate::remote::{keyring_store, RemoteInbox};

const USER_AGENT: &str = "notibox";
const DEFAULT_BASE_URL: &str = "https://api.github.com";
const DEFAULT_PAGE_SIZE: u32 = 50;

#[derive(Debug)]
pub struct GitHubRemote {
    token: String,
    base_url: Url,
    page_size: u32,
    client: Client,
    // Remote calls run from synchronous command paths, so the client
    // carries its own runtime instead of assuming an ambient one.
    runtime: Runtime,
}

impl GitHubRemote {
    /// Load the stored token from the OS keyring (empty if absent).
    pub fn new() -> Result<Self, RemoteError> {
        let token = keyring_store::get("github_token")
            .ok()
            .flatten()
            .unwrap_or_default();
        Self::with_token(token)
    }

    pub fn with_token(token: String) -> Result<Self, RemoteError> {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    /// Point the client at a different API root. Tests use this to
    /// target a local mock server. The root is parsed up front, so a
    /// malformed URL fails here rather than on the first request.
    pub fn with_base_url(token: String, base_url: &str) -> Result<Self, RemoteError> {
        let base_url = Url::parse(base_url)?;
        let runtime = Runtime::new().map_err(|e| RemoteError::Runtime(e.to_string()))?;
        Ok(Self {
            token,
            base_url,
            page_size: DEFAULT_PAGE_SIZE,
            client: Client::new(),
            runtime,
        })
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        self.page_size = page_size.max(1);
    }

    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }

    /// Persist a user-provided token to the OS keyring and update
    /// in-memory state.
    pub fn set_credentials(&mut self, token: &str) -> Result<(), Box<dyn std::error::Error>> {
        keyring_store::set("github_token", token)?;
        self.token = token.to_string();
        Ok(())
    }

    /// Remove the stored token.
    pub fn disconnect(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        keyring_store::delete("github_token")?;
        self.token.clear();
        Ok(())
    }

    /// Check the token against the API and return the authenticated
    /// login name.
    pub fn verify(&self) -> Result<String, RemoteError> {
        let resp = self.execute(self.request(Method::GET, "/user")?)?;
        let user: serde_json::Value = self
            .runtime
            .block_on(resp.json())
            .map_err(RemoteError::Network)?;
        Ok(user["login"].as_str().unwrap_or("unknown").to_string())
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, RemoteError> {
        let url = self.base_url.join(path)?;
        Ok(self
            .client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github.v3+json"))
    }

    fn execute(&self, request: RequestBuilder) -> Result<reqwest::Response, RemoteError> {
        if !self.is_authenticated() {
            return Err(RemoteError::NotAuthenticated);
        }
        let resp = self
            .runtime
            .block_on(request.send())
            .map_err(RemoteError::Network)?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if status.as_u16() == 429 {
            return Err(RemoteError::RateLimited);
        }
        let message = self.runtime.block_on(resp.text()).unwrap_or_default();
        Err(RemoteError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

impl RemoteInbox for GitHubRemote {
    fn fetch(&self) -> Result<Vec<NotificationItem>, RemoteError> {
        let path = format!("/notifications?per_page={}", self.page_size);
        let resp = self.execute(self.request(Method::GET, &path)?)?;
        let items: Vec<NotificationItem> = self
            .runtime
            .block_on(resp.json())
            .map_err(RemoteError::Network)?;
        Ok(items)
    }

    fn mark_read(&self, id: &str) -> Result<(), RemoteError> {
        let path = format!("/notifications/threads/{id}");
        self.execute(self.request(Method::PATCH, &path)?)?;
        Ok(())
    }

    fn mark_all_read(&self) -> Result<(), RemoteError> {
        self.execute(
            self.request(Method::PUT, "/notifications")?
                .json(&serde_json::json!({})),
        )?;
        Ok(())
    }

    fn unsubscribe(&self, id: &str) -> Result<(), RemoteError> {
        let path = format!("/notifications/threads/{id}/subscription");
        self.execute(self.request(Method::DELETE, &path)?)?;
        Ok(())
    }
}
