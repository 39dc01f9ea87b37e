//! Recipe comment endpoints.

use reqwest::Method;
use serde_json::json;

use super::client::{segment, send, send_unit, ApiClient};
use crate::models::{Comment, NewComment};
use crate::{ClientError, Result};

fn non_blank(content: &str) -> Result<&str> {
    let content = content.trim();
    if content.is_empty() {
        Err(ClientError::Validation("Comment cannot be empty".into()))
    } else {
        Ok(content)
    }
}

impl ApiClient {
    /// Comments on a recipe, as the server orders them.
    pub async fn list_comments(&self, recipe_id: &str) -> Result<Vec<Comment>> {
        let path = format!("/api/comments/{}", segment(recipe_id));
        send(self.request(Method::GET, &path)).await
    }

    pub async fn add_comment(&self, recipe_id: &str, content: &str) -> Result<Comment> {
        let body = NewComment {
            content: non_blank(content)?.to_string(),
            recipe_id: recipe_id.to_string(),
        };
        send(self.request(Method::POST, "/api/comments").json(&body)).await
    }

    pub async fn edit_comment(&self, comment_id: &str, content: &str) -> Result<Comment> {
        let path = format!("/api/comments/{}", segment(comment_id));
        let body = json!({ "content": non_blank(content)? });
        send(self.request(Method::PUT, &path).json(&body)).await
    }

    pub async fn delete_comment(&self, comment_id: &str) -> Result<()> {
        let path = format!("/api/comments/{}", segment(comment_id));
        send_unit(self.request(Method::DELETE, &path)).await
    }
}
