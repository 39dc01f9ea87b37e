//! Typed client for the SlowFood platform API.

mod ai;
mod auth;
mod client;
mod comments;
mod recipes;
mod users;

pub use client::ApiClient;

#[cfg(test)]
pub(crate) fn test_client(server: &wiremock::MockServer, token: Option<&str>) -> ApiClient {
    use crate::session::MemoryTokenStore;

    let config = crate::config::Config::new(Some(server.uri()), Some(std::env::temp_dir()), 5);
    let store = match token {
        Some(token) => MemoryTokenStore::with_token(token),
        None => MemoryTokenStore::new(),
    };
    ApiClient::new(&config, std::sync::Arc::new(store)).unwrap()
}
