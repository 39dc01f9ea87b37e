//! Route guards as predicates over the session.

use super::manager::Session;

/// Who may see a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Logged-in users only.
    Private,
    /// Anonymous users only (login, signup).
    AnonymousOnly,
}

/// What to show for a guarded view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Session still verifying; decision deferred.
    Loading,
    Render,
    Redirect(&'static str),
}

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// Decide what a view with `access` shows for `session`.
pub const fn gate(access: Access, session: &Session) -> Gate {
    if session.is_loading {
        return Gate::Loading;
    }
    match access {
        Access::Public => Gate::Render,
        Access::Private if session.is_logged_in => Gate::Render,
        Access::Private => Gate::Redirect(LOGIN_PATH),
        Access::AnonymousOnly if session.is_logged_in => Gate::Redirect(HOME_PATH),
        Access::AnonymousOnly => Gate::Render,
    }
}

/// A path pattern and its access level. `:name` segments match any value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub pattern: &'static str,
    pub access: Access,
}

impl Route {
    const fn new(pattern: &'static str, access: Access) -> Self {
        Self { pattern, access }
    }

    pub fn matches(&self, path: &str) -> bool {
        let mut pattern = self.pattern.split('/').filter(|s| !s.is_empty());
        let mut actual = path.split('/').filter(|s| !s.is_empty());
        loop {
            match (pattern.next(), actual.next()) {
                (None, None) => return true,
                (Some(p), Some(a)) if p.starts_with(':') || p == a => {}
                _ => return false,
            }
        }
    }
}

/// Application routes, most specific first.
pub const ROUTES: &[Route] = &[
    Route::new("/", Access::Public),
    Route::new("/profile", Access::Private),
    Route::new("/profile/edit", Access::Private),
    Route::new("/signup", Access::AnonymousOnly),
    Route::new("/login", Access::AnonymousOnly),
    Route::new("/users", Access::Private),
    Route::new("/users/:userId", Access::Private),
    Route::new("/recipes", Access::Public),
    Route::new("/recipes/create", Access::Private),
    Route::new("/recipes/edit/:id", Access::Private),
    Route::new("/recipes/:id", Access::Private),
    Route::new("/ai-cooking-assistant", Access::Private),
];

/// First route matching `path`.
pub fn route_for(path: &str) -> Option<&'static Route> {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    ROUTES.iter().find(|r| r.matches(path))
}
