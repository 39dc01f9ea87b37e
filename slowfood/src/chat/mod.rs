//! Cooking assistant conversation and the history payload it sends.

mod assistant;
pub mod history;

pub use assistant::{ChatAssistant, CookingAssistant, LOGIN_REQUIRED, QUICK_QUESTIONS, WELCOME_MESSAGE};
pub use history::build_history;
