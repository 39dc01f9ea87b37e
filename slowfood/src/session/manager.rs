//! Session manager: who is logged in, verified against the server.
//!
//! The manager never trusts a cached user. On start it reads the persisted
//! token and asks the auth service who it belongs to; until that answer
//! arrives the session reports `is_loading` and callers defer any
//! authorization decision.
//!
//! State lives in a `tokio::sync::watch` channel, so every transition is a
//! single atomic replace and any number of views can subscribe to changes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::store::TokenStore;
use crate::models::{ProfileUpdate, UserProfile};
use crate::Result;

/// Resolves a bearer token to the profile it belongs to.
#[async_trait]
pub trait AuthVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<UserProfile>;
}

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Startup or verification in flight; authorization is deferred.
    Verifying,
    Anonymous,
    Authenticated,
}

/// The client's current belief about who is logged in.
///
/// Build sessions with the constructors below; they keep `is_logged_in` and
/// `user` consistent. The fields stay public for reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub is_logged_in: bool,
    pub is_loading: bool,
    pub user: Option<UserProfile>,
}

impl Session {
    /// Initial state before verification has run.
    pub const fn loading() -> Self {
        Self {
            is_logged_in: false,
            is_loading: true,
            user: None,
        }
    }

    pub const fn anonymous() -> Self {
        Self {
            is_logged_in: false,
            is_loading: false,
            user: None,
        }
    }

    pub const fn authenticated(user: UserProfile) -> Self {
        Self {
            is_logged_in: true,
            is_loading: false,
            user: Some(user),
        }
    }

    pub const fn phase(&self) -> SessionPhase {
        if self.is_loading {
            SessionPhase::Verifying
        } else if self.is_logged_in {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }
}

type Verification = Shared<BoxFuture<'static, Session>>;

struct Inner {
    store: Arc<dyn TokenStore>,
    verifier: Arc<dyn AuthVerifier>,
    state: watch::Sender<Session>,
    /// Bumped by log in/out so late verifications of an older token are
    /// discarded instead of overwriting newer state.
    generation: AtomicU64,
    /// The verification every concurrent `initialize` call awaits. Cleared
    /// on log in/out so later callers never join a superseded flight.
    inflight: Mutex<Option<(u64, Verification)>>,
    next_flight: AtomicU64,
}

/// Shared handle to the session. Cloning is cheap; all clones see the same
/// state.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("session", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    pub fn new(store: Arc<dyn TokenStore>, verifier: Arc<dyn AuthVerifier>) -> Self {
        let (state, _rx) = watch::channel(Session::loading());
        Self {
            inner: Arc::new(Inner {
                store,
                verifier,
                state,
                generation: AtomicU64::new(0),
                inflight: Mutex::new(None),
                next_flight: AtomicU64::new(0),
            }),
        }
    }

    /// Current session.
    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// Receive every state change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    /// Persisted token, if any.
    pub fn token(&self) -> Result<Option<String>> {
        self.inner.store.get()
    }

    /// Resolve the session from the persisted token.
    ///
    /// Concurrent callers share one verification request. Verification
    /// failure is never an error here: the token is discarded and the
    /// session settles anonymous.
    pub async fn initialize(&self) -> Session {
        let (flight, verification) = {
            let mut slot = self
                .inner
                .inflight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);

            if let Some((flight, verification)) = slot.as_ref() {
                debug!("joining in-flight session verification");
                (*flight, verification.clone())
            } else {
                let flight = self.inner.next_flight.fetch_add(1, Ordering::SeqCst);
                let inner = Arc::clone(&self.inner);
                let verification = async move { inner.verify_stored().await }
                    .boxed()
                    .shared();
                *slot = Some((flight, verification.clone()));
                (flight, verification)
            }
        };

        let session = verification.await;

        let mut slot = self
            .inner
            .inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|(f, _)| *f == flight) {
            *slot = None;
        }

        session
    }

    /// Wait until no verification is pending and return the settled session.
    pub async fn settled(&self) -> Session {
        let mut rx = self.subscribe();
        let result = rx.wait_for(|s| !s.is_loading).await.map(|s| s.clone());
        result.unwrap_or_else(|_| self.snapshot())
    }

    /// Persist a freshly issued token. Run [`initialize`](Self::initialize)
    /// afterwards to load the user.
    pub fn log_in(&self, token: &str) -> Result<()> {
        self.inner.store.set(token)?;
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.forget_inflight();
        debug!("stored new auth token");
        Ok(())
    }

    /// Forget the token and the user. Local only; never touches the network.
    pub fn log_out(&self) {
        if let Err(err) = self.inner.store.clear() {
            warn!(error = %err, "failed to remove persisted auth token");
        }
        self.inner.state.send_modify(|s| {
            self.inner.generation.fetch_add(1, Ordering::SeqCst);
            *s = Session::anonymous();
        });
        self.inner.forget_inflight();
        info!("logged out");
    }

    /// Optimistically apply profile edits to the in-memory user.
    pub fn update_user_fields(&self, update: &ProfileUpdate) {
        self.inner.state.send_if_modified(|s| match s.user.as_mut() {
            Some(user) if !update.is_empty() => {
                user.merge(update);
                true
            }
            _ => false,
        });
    }

    /// Re-verify the current user and return the fresh profile.
    ///
    /// Returns `None` when logged out or when verification fails. A failed
    /// refresh leaves the session as it was; only `initialize` demotes a
    /// session whose token stopped verifying.
    pub async fn refresh(&self) -> Option<UserProfile> {
        if !self.inner.state.borrow().is_logged_in {
            return None;
        }

        let generation = self.inner.generation.load(Ordering::SeqCst);
        let token = match self.inner.store.get() {
            Ok(Some(token)) => token,
            Ok(None) => {
                warn!("refresh requested but no auth token is stored");
                return None;
            }
            Err(err) => {
                warn!(error = %err, "failed to read auth token for refresh");
                return None;
            }
        };

        match self.inner.verifier.verify(&token).await {
            Ok(user) => {
                let fresh = user.clone();
                self.inner.state.send_if_modified(|s| {
                    if s.is_logged_in && self.inner.generation.load(Ordering::SeqCst) == generation {
                        s.user = Some(fresh);
                        true
                    } else {
                        false
                    }
                });
                Some(user)
            }
            Err(err) => {
                warn!(error = %err, "failed to refresh user data");
                None
            }
        }
    }
}

impl Inner {
    /// Verify the stored token until a result lands on the current
    /// generation. A log in during verification restarts it with the new
    /// token, so a loading session always settles.
    async fn verify_stored(self: Arc<Self>) -> Session {
        loop {
            let generation = self.generation.load(Ordering::SeqCst);
            let next = self.verify_once(generation).await;
            if let Some(session) = self.apply(generation, next) {
                return session;
            }
            debug!("auth token changed during verification; verifying again");
        }
    }

    async fn verify_once(&self, generation: u64) -> Session {

        let token = self.store.get().unwrap_or_else(|err| {
            warn!(error = %err, "failed to read persisted auth token");
            None
        });

        let Some(token) = token else {
            debug!("no persisted token; session is anonymous");
            return Session::anonymous();
        };

        self.state.send_if_modified(|s| {
            let changed = !s.is_loading;
            s.is_loading = true;
            changed
        });

        match self.verifier.verify(&token).await {
            Ok(user) => {
                info!(user = %user.id, "session verified");
                Session::authenticated(user)
            }
            Err(err) => {
                warn!(error = %err, "stored token failed verification; continuing anonymously");
                self.discard_token(generation, &token);
                Session::anonymous()
            }
        }
    }

    fn forget_inflight(&self) {
        *self.inflight.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Remove `token` unless a newer one has been stored meanwhile.
    fn discard_token(&self, generation: u64, token: &str) {
        if self.generation.load(Ordering::SeqCst) != generation {
            return;
        }
        match self.store.get() {
            Ok(Some(current)) if current == token => {
                if let Err(err) = self.store.clear() {
                    warn!(error = %err, "failed to remove rejected auth token");
                }
            }
            Ok(_) => {}
            Err(err) => warn!(error = %err, "failed to read auth token before removal"),
        }
    }

    /// Publish `next` unless log in/out happened while it was computed.
    /// Returns `None` for a stale result.
    fn apply(&self, generation: u64, next: Session) -> Option<Session> {
        let mut published = None;
        self.state.send_if_modified(|s| {
            if self.generation.load(Ordering::SeqCst) == generation {
                *s = next.clone();
                published = Some(next);
                true
            } else {
                debug!("discarding stale verification result");
                false
            }
        });
        published
    }
}
