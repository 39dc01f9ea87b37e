//! User directory, follow graph and profile endpoints.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{CACHE_CONTROL, EXPIRES, PRAGMA};
use reqwest::Method;
use tracing::info;

use super::client::{segment, send, send_unit, ApiClient};
use crate::models::{ProfileUpdate, UserProfile};
use crate::social::FollowApi;
use crate::{ClientError, Result};

impl ApiClient {
    pub async fn list_users(&self) -> Result<Vec<UserProfile>> {
        send(self.request(Method::GET, "/api/users")).await
    }

    /// Fetch one profile, bypassing intermediate caches.
    pub async fn get_user(&self, user_id: &str) -> Result<UserProfile> {
        let path = format!("/api/users/{}", segment(user_id));
        let stamp = Utc::now().timestamp_millis().to_string();
        send(self.request(Method::GET, &path).query(&[("t", stamp)])).await
    }

    pub async fn followers(&self, user_id: &str) -> Result<Vec<UserProfile>> {
        let path = format!("/api/users/{}/followers", segment(user_id));
        send(self.request(Method::GET, &path)).await
    }

    pub async fn following(&self, user_id: &str) -> Result<Vec<UserProfile>> {
        let path = format!("/api/users/{}/following", segment(user_id));
        send(self.request(Method::GET, &path)).await
    }

    /// Users the server suggests following.
    pub async fn discover_users(&self) -> Result<Vec<UserProfile>> {
        send(self.request(Method::GET, "/api/users/discover")).await
    }

    /// Update the current user's profile and return the stored version.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile> {
        if update.is_empty() {
            return Err(ClientError::Validation("Nothing to update".into()));
        }
        if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(ClientError::Validation("Name cannot be empty".into()));
        }

        let user: UserProfile = send(
            self.request(Method::PUT, "/api/users/profile")
                .header(CACHE_CONTROL, "no-cache")
                .header(PRAGMA, "no-cache")
                .header(EXPIRES, "0")
                .json(update),
        )
        .await?;
        info!(user = %user.id, "profile updated");
        Ok(user)
    }
}

#[async_trait]
impl FollowApi for ApiClient {
    async fn follow(&self, user_id: &str) -> Result<()> {
        let path = format!("/api/users/{}/follow", segment(user_id));
        send_unit(self.request(Method::POST, &path)).await
    }

    async fn unfollow(&self, user_id: &str) -> Result<()> {
        let path = format!("/api/users/{}/unfollow", segment(user_id));
        send_unit(self.request(Method::POST, &path)).await
    }
}
