//! Follow and like state as the current user sees it.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::models::{Recipe, UserProfile};
use crate::session::Session;
use crate::{ClientError, Result};

/// Follow/unfollow endpoints.
#[async_trait]
pub trait FollowApi: Send + Sync {
    async fn follow(&self, user_id: &str) -> Result<()>;
    async fn unfollow(&self, user_id: &str) -> Result<()>;
}

/// Like/unlike endpoints. Both return the recipe as updated by the server.
#[async_trait]
pub trait LikeApi: Send + Sync {
    async fn like(&self, recipe_id: &str) -> Result<Recipe>;
    async fn unlike(&self, recipe_id: &str) -> Result<Recipe>;
}

const LOGIN_REQUIRED: &str = "Please log in first";

fn require_login(session: &Session) -> Result<&str> {
    match session.user_id() {
        Some(id) if session.is_logged_in => Ok(id),
        _ => Err(ClientError::Validation(LOGIN_REQUIRED.into())),
    }
}

/// Ids of the users the current user follows.
///
/// Toggling takes `&mut self`, so one follow action is in progress at a
/// time. The set changes only after the server accepted the action.
#[derive(Debug, Clone, Default)]
pub struct FollowTracker {
    following: HashSet<String>,
}

impl FollowTracker {
    pub fn new(ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            following: ids.into_iter().collect(),
        }
    }

    pub fn from_users(users: &[UserProfile]) -> Self {
        Self::new(users.iter().map(|u| u.id.clone()))
    }

    pub fn is_following(&self, user_id: &str) -> bool {
        self.following.contains(user_id)
    }

    pub fn len(&self) -> usize {
        self.following.len()
    }

    pub fn is_empty(&self) -> bool {
        self.following.is_empty()
    }

    /// Follow `target` if not followed yet, unfollow otherwise. Returns
    /// whether `target` is followed afterwards.
    pub async fn toggle(
        &mut self,
        api: &dyn FollowApi,
        session: &Session,
        target: &str,
    ) -> Result<bool> {
        let me = require_login(session)?;
        if me == target {
            return Err(ClientError::Validation("You cannot follow yourself".into()));
        }

        let result = if self.is_following(target) {
            api.unfollow(target).await.map(|()| false)
        } else {
            api.follow(target).await.map(|()| true)
        };

        match result {
            Ok(true) => {
                self.following.insert(target.to_string());
                debug!(user = target, "followed");
                Ok(true)
            }
            Ok(false) => {
                self.following.remove(target);
                debug!(user = target, "unfollowed");
                Ok(false)
            }
            Err(err) => {
                warn!(error = %err, user = target, "failed to update follow relationship");
                Err(err)
            }
        }
    }
}

/// Like status of one recipe for the current user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LikeState {
    pub liked: bool,
    pub count: usize,
}

impl LikeState {
    pub fn for_recipe(recipe: &Recipe, session: &Session) -> Self {
        Self {
            liked: session.user_id().is_some_and(|id| recipe.is_liked_by(id)),
            count: recipe.likes.len(),
        }
    }

    /// Like or unlike. The count is taken from the server's reply.
    pub async fn toggle(
        &mut self,
        api: &dyn LikeApi,
        session: &Session,
        recipe_id: &str,
    ) -> Result<bool> {
        require_login(session)?;

        let updated = if self.liked {
            api.unlike(recipe_id).await?
        } else {
            api.like(recipe_id).await?
        };

        self.liked = !self.liked;
        self.count = updated.likes.len();
        Ok(self.liked)
    }
}

/// Users to list: everyone but the current user, filtered by `term` on name
/// or email.
pub fn visible_users<'a>(
    users: &'a [UserProfile],
    session: &Session,
    term: Option<&str>,
) -> Vec<&'a UserProfile> {
    let me = session.user_id();
    let term = term.map(str::trim).filter(|t| !t.is_empty());
    users
        .iter()
        .filter(|u| Some(u.id.as_str()) != me)
        .filter(|u| term.is_none_or(|t| u.matches(t)))
        .collect()
}
