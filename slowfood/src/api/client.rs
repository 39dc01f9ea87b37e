//! HTTP plumbing shared by every endpoint group.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::Config;
use crate::session::TokenStore;
use crate::{ClientError, Result};

/// Client for the SlowFood platform API.
///
/// Every request carries the stored token as a bearer credential when one
/// exists. The token is read per request, so a log in or out is picked up by
/// the next call.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(config: &Config, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("slowfood/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.server_url.clone(),
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// A request without credentials.
    pub(crate) fn anonymous(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        debug!(%method, %url, "request");
        self.http.request(method, url)
    }

    /// A request carrying the stored token, if any.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.anonymous(method, path);
        match self.tokens.get() {
            Ok(Some(token)) => builder.bearer_auth(token),
            Ok(None) => builder,
            Err(err) => {
                warn!(error = %err, "could not read stored token, sending without it");
                builder
            }
        }
    }
}

/// Send and decode a JSON body.
pub(crate) async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let body = checked_body(request).await?;
    Ok(serde_json::from_str(&body)?)
}

/// Send and ignore whatever the server answered with.
pub(crate) async fn send_unit(request: RequestBuilder) -> Result<()> {
    checked_body(request).await.map(drop)
}

async fn checked_body(request: RequestBuilder) -> Result<String> {
    let resp = request.send().await?;
    let status = resp.status();
    let body = resp.text().await?;

    if status.is_success() {
        Ok(body)
    } else {
        debug!(%status, "request rejected");
        Err(ClientError::from_status(status, &body))
    }
}

/// Percent-encode one path segment.
pub(crate) fn segment(id: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(id)
}
