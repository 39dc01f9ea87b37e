//! Session state: token persistence, verification, and route guards.

pub mod guard;
mod manager;
mod store;

pub use guard::{gate, route_for, Access, Gate, Route, HOME_PATH, LOGIN_PATH, ROUTES};
pub use manager::{AuthVerifier, Session, SessionManager, SessionPhase};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
