//! Builds the bounded history payload for the AI chat endpoint.
//!
//! The provider only accepts an empty history or one that starts with a user
//! turn, and it calls assistant turns `model`. Local transcripts are freer
//! than that, so the payload is rebuilt from user-initiated pairs only.

use crate::models::{ChatMessage, ChatRole, HistoryEntry, WireRole};

/// At most three user/model exchanges.
pub const MAX_HISTORY_ENTRIES: usize = 6;

/// Shorter histories are sent as empty.
pub const MIN_HISTORY_ENTRIES: usize = 2;

/// History to send alongside `outgoing`.
///
/// `transcript[0]` is the welcome message and is never sent. Each user turn
/// is kept, followed by the assistant turn right after it when there is
/// one; everything else is dropped. The result is the last
/// [`MAX_HISTORY_ENTRIES`] entries, never starting with a model turn, or
/// empty when fewer than [`MIN_HISTORY_ENTRIES`] remain.
pub fn build_history(transcript: &[ChatMessage], outgoing: &str) -> Vec<HistoryEntry> {
    let prior = match transcript {
        [_welcome, rest @ ..] if !rest.is_empty() => rest,
        _ => &[],
    };

    let outgoing = ChatMessage::user(outgoing);
    let candidate: Vec<&ChatMessage> = prior.iter().chain(std::iter::once(&outgoing)).collect();

    let mut entries = Vec::with_capacity(candidate.len());
    for (i, message) in candidate.iter().enumerate() {
        if message.role != ChatRole::User {
            continue;
        }
        entries.push(HistoryEntry {
            role: WireRole::User,
            content: message.content.clone(),
        });
        if let Some(reply) = candidate.get(i + 1).filter(|m| m.role == ChatRole::Assistant) {
            entries.push(HistoryEntry {
                role: WireRole::Model,
                content: reply.content.clone(),
            });
        }
    }

    let mut window = entries.split_off(entries.len().saturating_sub(MAX_HISTORY_ENTRIES));
    // A window cut between a pair would open on the model half.
    if window.first().is_some_and(|e| e.role == WireRole::Model) {
        window.remove(0);
    }

    if window.len() < MIN_HISTORY_ENTRIES {
        Vec::new()
    } else {
        window
    }
}
