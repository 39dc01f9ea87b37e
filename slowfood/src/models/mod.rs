//! Data models for SlowFood entities.

mod chat;
mod comment;
mod recipe;
mod user;

pub use chat::{AiReply, ChatMessage, ChatRole, HistoryEntry, WireRole};
pub use comment::{Comment, NewComment};
pub use recipe::{AuthorRef, DietaryFlags, Recipe, RecipeDraft, RecipePage, RecipeQuery};
pub use user::{Credentials, ProfileUpdate, Signup, UserProfile};
