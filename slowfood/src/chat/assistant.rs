//! Conversation state for the cooking assistant.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::history::build_history;
use crate::models::{ChatMessage, DietaryFlags, HistoryEntry, RecipeDraft};
use crate::session::Session;
use crate::{ClientError, Result};

/// Greeting shown as the first transcript entry. Never sent to the server.
pub const WELCOME_MESSAGE: &str = "Hi! I'm your cooking assistant. I can help you with recipes, \
     ingredients, cooking techniques and more. What can I help you with today?";

/// Starter prompts offered while the conversation is fresh.
pub const QUICK_QUESTIONS: &[&str] = &[
    "What can I cook with chicken and rice?",
    "How can I substitute butter?",
    "Tips for cutting onions without crying",
    "What is the ideal temperature for cooking fish?",
];

pub const LOGIN_REQUIRED: &str = "Please log in to use the assistant";
const CHAT_FAILED: &str = "Could not reach the assistant. Please try again later.";
const INGREDIENT_FAILED: &str = "Could not get ingredient information. Please try again.";
const SUGGEST_FAILED: &str = "Could not suggest recipes. Please try again.";

/// The AI endpoints the assistant talks to. Each returns the reply text.
#[async_trait]
pub trait CookingAssistant: Send + Sync {
    async fn chat(&self, message: &str, history: &[HistoryEntry]) -> Result<String>;
    async fn ingredient_info(&self, ingredient: &str) -> Result<String>;
    async fn suggest_recipes(
        &self,
        ingredients: &[String],
        preferences: &DietaryFlags,
    ) -> Result<String>;
}

/// A running conversation: transcript, loading flag, and the error the user
/// should see.
pub struct ChatAssistant {
    backend: Arc<dyn CookingAssistant>,
    transcript: Vec<ChatMessage>,
    is_loading: bool,
    error: Option<String>,
}

impl ChatAssistant {
    pub fn new(backend: Arc<dyn CookingAssistant>) -> Self {
        Self {
            backend,
            transcript: vec![ChatMessage::assistant(WELCOME_MESSAGE)],
            is_loading: false,
            error: None,
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub const fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Error to display, if the last action failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Starter prompts, offered only until the conversation gets going.
    pub fn quick_questions(&self) -> &'static [&'static str] {
        if self.transcript.len() <= 2 {
            QUICK_QUESTIONS
        } else {
            &[]
        }
    }

    /// Send a free-form message with recent history as context.
    pub async fn send(&mut self, input: &str, session: &Session) -> Result<String> {
        if input.trim().is_empty() {
            return Err(ClientError::Validation("Message is empty".into()));
        }
        self.require_login(session)?;

        let history = build_history(&self.transcript, input);
        debug!(entries = history.len(), "sending chat message");
        self.transcript.push(ChatMessage::user(input));
        self.begin();

        let backend = Arc::clone(&self.backend);
        let result = backend.chat(input, &history).await;
        self.finish(result, CHAT_FAILED)
    }

    /// Ask about a single ingredient.
    pub async fn ingredient_info(&mut self, ingredient: &str, session: &Session) -> Result<String> {
        let ingredient = ingredient.trim();
        if ingredient.is_empty() {
            return Err(ClientError::Validation("Ingredient is empty".into()));
        }
        self.require_login(session)?;

        self.transcript.push(ChatMessage::user(format!(
            "Information about the ingredient: {ingredient}"
        )));
        self.begin();

        let backend = Arc::clone(&self.backend);
        let result = backend.ingredient_info(ingredient).await;
        self.finish(result, INGREDIENT_FAILED)
    }

    /// Suggest recipes for a comma separated ingredient list.
    pub async fn suggest_recipes(
        &mut self,
        ingredients: &str,
        preferences: &DietaryFlags,
        session: &Session,
    ) -> Result<String> {
        let list = RecipeDraft::parse_ingredients(ingredients);
        if list.is_empty() {
            return Err(ClientError::Validation("No ingredients given".into()));
        }
        self.require_login(session)?;

        self.transcript.push(ChatMessage::user(format!(
            "Suggest recipes with: {}",
            list.join(", ")
        )));
        self.begin();

        let backend = Arc::clone(&self.backend);
        let result = backend.suggest_recipes(&list, preferences).await;
        self.finish(result, SUGGEST_FAILED)
    }

    fn require_login(&mut self, session: &Session) -> Result<()> {
        if session.is_logged_in {
            Ok(())
        } else {
            self.error = Some(LOGIN_REQUIRED.to_string());
            Err(ClientError::Validation(LOGIN_REQUIRED.into()))
        }
    }

    fn begin(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    fn finish(&mut self, result: Result<String>, failure: &str) -> Result<String> {
        self.is_loading = false;
        match result {
            Ok(reply) => {
                self.transcript.push(ChatMessage::assistant(reply.clone()));
                Ok(reply)
            }
            Err(err) => {
                warn!(error = %err, "assistant request failed");
                self.error = Some(failure.to_string());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChatRole, UserProfile, WireRole};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        histories: Mutex<Vec<Vec<HistoryEntry>>>,
        suggestions: Mutex<Vec<(Vec<String>, DietaryFlags)>>,
        fail: bool,
    }

    #[async_trait]
    impl CookingAssistant for Recorder {
        async fn chat(&self, message: &str, history: &[HistoryEntry]) -> Result<String> {
            self.histories.lock().unwrap().push(history.to_vec());
            if self.fail {
                return Err(ClientError::Assistant("model overloaded".into()));
            }
            Ok(format!("echo: {message}"))
        }

        async fn ingredient_info(&self, ingredient: &str) -> Result<String> {
            Ok(format!("{ingredient} is a spice"))
        }

        async fn suggest_recipes(
            &self,
            ingredients: &[String],
            preferences: &DietaryFlags,
        ) -> Result<String> {
            self.suggestions
                .lock()
                .unwrap()
                .push((ingredients.to_vec(), *preferences));
            Ok("Try a risotto".into())
        }
    }

    fn logged_in() -> Session {
        Session::authenticated(UserProfile {
            id: "u1".into(),
            name: "Ana".into(),
            email: "ana@example.com".into(),
            bio: None,
            profile_image: None,
            extra: serde_json::Map::new(),
        })
    }

    #[tokio::test]
    async fn test_conversation_builds_history() {
        let backend = Arc::new(Recorder::default());
        let mut assistant = ChatAssistant::new(backend.clone());
        let session = logged_in();

        assert_eq!(assistant.quick_questions().len(), QUICK_QUESTIONS.len());

        let first = assistant.send("Paella tips?", &session).await.unwrap();
        assert_eq!(first, "echo: Paella tips?");
        assistant.send("And the rice?", &session).await.unwrap();

        let histories = backend.histories.lock().unwrap();
        assert!(histories[0].is_empty());
        assert_eq!(histories[1].len(), 3);
        assert_eq!(histories[1][1].role, WireRole::Model);
        assert_eq!(histories[1][2].content, "And the rice?");
        drop(histories);

        assert_eq!(assistant.transcript().len(), 5);
        assert!(assistant.quick_questions().is_empty());
        assert!(!assistant.is_loading());
        assert!(assistant.error().is_none());
    }

    #[tokio::test]
    async fn test_blank_message_rejected_without_request() {
        let backend = Arc::new(Recorder::default());
        let mut assistant = ChatAssistant::new(backend.clone());

        let err = assistant.send("   ", &logged_in()).await.unwrap_err();

        assert!(matches!(err, ClientError::Validation(_)));
        assert!(backend.histories.lock().unwrap().is_empty());
        assert_eq!(assistant.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_anonymous_gets_login_prompt() {
        let backend = Arc::new(Recorder::default());
        let mut assistant = ChatAssistant::new(backend.clone());

        assert!(assistant.send("hello", &Session::anonymous()).await.is_err());

        assert_eq!(assistant.error(), Some(LOGIN_REQUIRED));
        assert!(backend.histories.lock().unwrap().is_empty());
        assert_eq!(assistant.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_sets_visible_error_and_clears_loading() {
        let backend = Arc::new(Recorder {
            fail: true,
            ..Recorder::default()
        });
        let mut assistant = ChatAssistant::new(backend);

        let err = assistant.send("hello", &logged_in()).await.unwrap_err();

        assert!(matches!(err, ClientError::Assistant(_)));
        assert_eq!(assistant.error(), Some(CHAT_FAILED));
        assert!(!assistant.is_loading());
        // The user's turn stays in the transcript.
        let last = assistant.transcript().last().unwrap();
        assert_eq!(last.role, ChatRole::User);
    }

    #[tokio::test]
    async fn test_suggest_recipes_splits_ingredients() {
        let backend = Arc::new(Recorder::default());
        let mut assistant = ChatAssistant::new(backend.clone());
        let prefs = DietaryFlags {
            vegan: true,
            ..DietaryFlags::default()
        };

        let reply = assistant
            .suggest_recipes("rice, peas ,, saffron", &prefs, &logged_in())
            .await
            .unwrap();

        assert_eq!(reply, "Try a risotto");
        let calls = backend.suggestions.lock().unwrap();
        assert_eq!(calls[0].0, vec!["rice", "peas", "saffron"]);
        assert!(calls[0].1.vegan);
        assert_eq!(
            assistant.transcript()[1].content,
            "Suggest recipes with: rice, peas, saffron"
        );
    }

    #[tokio::test]
    async fn test_ingredient_info_appends_turns() {
        let mut assistant = ChatAssistant::new(Arc::new(Recorder::default()));

        let reply = assistant
            .ingredient_info("saffron", &logged_in())
            .await
            .unwrap();

        assert_eq!(reply, "saffron is a spice");
        assert_eq!(
            assistant.transcript()[1].content,
            "Information about the ingredient: saffron"
        );
        assert_eq!(assistant.transcript()[2].role, ChatRole::Assistant);
    }
}
