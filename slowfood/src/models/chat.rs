//! Chat turns, the wire history format, and AI endpoint replies.

use serde::{Deserialize, Serialize};

/// Role of a local chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Message typed by the user.
    User,
    /// Reply from the cooking assistant.
    Assistant,
}

impl ChatRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One turn in a local conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Role tag expected by the AI provider. Assistant turns are labelled
/// `model` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    User,
    Model,
}

/// One entry of the history payload sent to `/api/ai/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: WireRole,
    pub content: String,
}

/// Envelope returned by every AI endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AiReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_strings() {
        assert_eq!(ChatRole::parse("user"), Some(ChatRole::User));
        assert_eq!(ChatRole::parse(ChatRole::Assistant.as_str()), Some(ChatRole::Assistant));
        assert_eq!(ChatRole::parse("model"), None);
    }

    #[test]
    fn test_wire_role_serializes_as_model() {
        let entry = HistoryEntry {
            role: WireRole::Model,
            content: "Use olive oil.".into(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["role"], "model");
    }

    #[test]
    fn test_ai_reply_without_data() {
        let reply: AiReply =
            serde_json::from_str(r#"{"success":false,"message":"quota exceeded"}"#).unwrap();
        assert!(!reply.success);
        assert!(reply.data.is_none());
        assert_eq!(reply.message.as_deref(), Some("quota exceeded"));
    }
}
