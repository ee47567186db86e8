//! Access gate for protected pages.
//!
//! A page starts `Unchecked` and shows a placeholder. The gate waits for the
//! auth store to finish rehydrating, then either grants access (running the
//! page's initial load exactly once) or redirects. Once decided, the gate does
//! not re-run; later logouts are handled by the unauthorized hook or by a
//! fresh page.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, warn};

use super::session::{AuthStore, Session};
use crate::models::UserRole;
use crate::routes::{Navigator, Route};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Authenticated,
    Role(UserRole),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    Unchecked,
    Granted,
    /// Access refused; the navigator was sent to this route.
    Denied(Route),
}

pub struct PageGate {
    requirement: Requirement,
    fallback: Route,
    state: GateState,
    loaded: bool,
}

impl PageGate {
    pub fn new(requirement: Requirement) -> Self {
        Self {
            requirement,
            fallback: Route::Home,
            state: GateState::Unchecked,
            loaded: false,
        }
    }

    pub fn authenticated() -> Self {
        Self::new(Requirement::Authenticated)
    }

    pub fn admin() -> Self {
        Self::new(Requirement::Role(UserRole::Admin))
    }

    /// Where an authenticated user without the required role is sent.
    pub fn with_fallback(mut self, route: Route) -> Self {
        self.fallback = route;
        self
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn is_granted(&self) -> bool {
        self.state == GateState::Granted
    }

    /// Wait for rehydration, then decide. A decided gate returns its state unchanged.
    pub async fn check(&mut self, store: &AuthStore, navigator: &dyn Navigator) -> &GateState {
        if self.state == GateState::Unchecked {
            store.wait_rehydrated().await;
            self.settle(store.session(), navigator);
        }
        &self.state
    }

    /// Like [`PageGate::check`], but a store that has not rehydrated within
    /// `limit` is treated as logged out.
    pub async fn check_with_timeout(
        &mut self,
        store: &AuthStore,
        navigator: &dyn Navigator,
        limit: Duration,
    ) -> &GateState {
        if self.state == GateState::Unchecked {
            let session = match tokio::time::timeout(limit, store.wait_rehydrated()).await {
                Ok(()) => store.session(),
                Err(_) => {
                    warn!(limit_ms = limit.as_millis() as u64, "Auth store did not rehydrate in time");
                    Session::empty()
                }
            };
            self.settle(session, navigator);
        }
        &self.state
    }

    /// Check access and, on the first grant only, run the page's initial load.
    ///
    /// Returns `Ok(None)` when access is denied or the load already ran.
    pub async fn enter<T, F, Fut>(
        &mut self,
        store: &AuthStore,
        navigator: &dyn Navigator,
        load: F,
    ) -> Result<Option<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.check(store, navigator).await;
        if self.state != GateState::Granted || self.loaded {
            return Ok(None);
        }
        self.loaded = true;
        load().await.map(Some)
    }

    /// Pure access decision for a session.
    pub fn decide(&self, session: &Session) -> GateState {
        if !session.is_authenticated() {
            return GateState::Denied(Route::Login);
        }
        match self.requirement {
            Requirement::Authenticated => GateState::Granted,
            Requirement::Role(role) if session.role() == Some(role) => GateState::Granted,
            Requirement::Role(_) => GateState::Denied(self.fallback.clone()),
        }
    }

    fn settle(&mut self, session: Session, navigator: &dyn Navigator) {
        self.state = self.decide(&session);
        match &self.state {
            GateState::Denied(route) => {
                debug!(requirement = ?self.requirement, to = %route, "Page access denied");
                navigator.navigate(route.clone());
            }
            GateState::Granted => debug!(requirement = ?self.requirement, "Page access granted"),
            GateState::Unchecked => {}
        }
    }
}
