//! Cooking assistant endpoints under `/api/ai`.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;

use super::client::{send, ApiClient};
use crate::chat::CookingAssistant;
use crate::models::{AiReply, DietaryFlags, HistoryEntry};
use crate::{ClientError, Result};

impl ApiClient {
    async fn ask(&self, path: &str, body: serde_json::Value, fallback: &str) -> Result<String> {
        let reply: AiReply = send(self.request(Method::POST, path).json(&body)).await?;
        match reply {
            AiReply {
                success: true,
                data: Some(text),
                ..
            } => Ok(text),
            AiReply { message, .. } => Err(ClientError::Assistant(
                message.unwrap_or_else(|| fallback.to_string()),
            )),
        }
    }
}

#[async_trait]
impl CookingAssistant for ApiClient {
    async fn chat(&self, message: &str, history: &[HistoryEntry]) -> Result<String> {
        let body = json!({ "message": message, "history": history });
        self.ask("/api/ai/chat", body, "No reply from the assistant")
            .await
    }

    async fn ingredient_info(&self, ingredient: &str) -> Result<String> {
        let body = json!({ "ingredient": ingredient });
        self.ask(
            "/api/ai/ingredient-info",
            body,
            "Error getting ingredient information",
        )
        .await
    }

    async fn suggest_recipes(
        &self,
        ingredients: &[String],
        preferences: &DietaryFlags,
    ) -> Result<String> {
        let body = json!({ "ingredients": ingredients, "preferences": preferences });
        self.ask("/api/ai/suggest-recipes", body, "Error suggesting recipes")
            .await
    }
}
