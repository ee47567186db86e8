//! Shared state for one CLI invocation: config, auth store and navigation.

use std::future::Future;
use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Context, Result};
use tracing::debug;

use califica_core::api::{ApiClient, LogoutRedirect};
use califica_core::auth::{AuthStore, GateState, PageGate};
use califica_core::config::Config;
use califica_core::routes::{Navigator, Route};

/// A protected page refused access. The navigator has already told the user
/// where to go instead.
#[derive(Debug, thiserror::Error)]
#[error("Access to {from} refused, redirected to {to}")]
pub struct Redirected {
    pub from: Route,
    pub to: Route,
}

/// Navigator for a terminal: there is nothing to show, so a redirect ends
/// the current command with a notice naming the new route.
pub struct TerminalNavigator {
    current: Mutex<Route>,
}

impl Default for TerminalNavigator {
    fn default() -> Self {
        Self {
            current: Mutex::new(Route::Home),
        }
    }
}

impl TerminalNavigator {
    /// Record that a command is now showing `route`.
    pub fn arrive(&self, route: Route) {
        debug!(route = %route, "Entering page");
        *self.lock() = route;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Route> {
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Navigator for TerminalNavigator {
    fn current_route(&self) -> Route {
        self.lock().clone()
    }

    fn navigate(&self, route: Route) {
        let message = match route {
            Route::Login => "Please log in: califica login",
            Route::Home => "You do not have access to that page.",
            _ => "",
        };
        if !message.is_empty() {
            eprintln!("{}", message);
        }
        eprintln!("-> {}", route);
        *self.lock() = route;
    }
}

pub struct App {
    pub config: Config,
    pub store: Arc<AuthStore>,
    pub navigator: Arc<TerminalNavigator>,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let storage = config.open_storage()?;
        Ok(Self {
            store: AuthStore::open(storage),
            navigator: Arc::new(TerminalNavigator::default()),
            config,
        })
    }

    /// Client for `/login` and `/signup`: no credentials, and a 401 is only
    /// a failed attempt.
    pub fn public_client(&self, route: Route) -> Result<ApiClient> {
        self.navigator.arrive(route);
        ApiClient::public(&self.config)
    }

    /// Client for every other page: sends the stored token and logs out on 401.
    pub fn client(&self, route: Route) -> Result<ApiClient> {
        self.navigator.arrive(route);
        let handler = Arc::new(LogoutRedirect::new(self.store.clone(), self.navigator.clone()));
        ApiClient::authorized(&self.config, self.store.clone(), handler)
    }

    /// Run `load` behind `gate`. A refusal is returned as [`Redirected`].
    pub async fn guarded<T, F, Fut>(&self, route: Route, mut gate: PageGate, load: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.navigator.arrive(route.clone());
        let loaded = gate.enter(&self.store, self.navigator.as_ref(), load).await?;
        match (loaded, gate.state()) {
            (Some(value), _) => Ok(value),
            (None, GateState::Denied(to)) => {
                debug!(to = %to, "Page gate refused access");
                Err(Redirected {
                    from: route,
                    to: to.clone(),
                }
                .into())
            }
            (None, _) => bail!("Page {} was already loaded", route),
        }
    }

    /// Check access without loading anything.
    pub async fn ensure_allowed(&self, route: Route, gate: PageGate) -> Result<()> {
        self.guarded(route, gate, || async { Ok(()) }).await
    }
}

/// Read one line from stdin after showing `label`. A blank answer takes `default`.
pub fn prompt(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(d) if !d.is_empty() => print!("{} [{}]: ", label, d),
        _ => print!("{}: ", label),
    }
    io::stdout().flush().context("Failed to write prompt")?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read input")?;
    let answer = line.trim().to_string();
    Ok(match default {
        Some(d) if answer.is_empty() => d.to_string(),
        _ => answer,
    })
}

pub fn prompt_password(label: &str) -> Result<String> {
    rpassword::prompt_password(format!("{}: ", label)).context("Failed to read password")
}

#[cfg(test)]
mod tests {
    use super::*;
    use califica_core::config::StorageBackend;
    use califica_core::models::{User, UserRole};

    fn app() -> App {
        App::new(Config {
            storage: StorageBackend::Memory,
            ..Config::default()
        })
        .unwrap()
    }

    fn student() -> User {
        User {
            id: "u1".into(),
            email: "ana@uni.edu".into(),
            name: "Ana".into(),
            role: UserRole::Student,
            is_email_verified: Some(true),
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_guarded_page_refuses_logged_out_user() {
        let app = app();
        let mut ran = false;

        let err = app
            .guarded(Route::Profile, PageGate::authenticated(), || {
                ran = true;
                async { Ok(()) }
            })
            .await
            .unwrap_err();

        let redirected = err.downcast_ref::<Redirected>().unwrap();
        assert_eq!(redirected.from, Route::Profile);
        assert_eq!(redirected.to, Route::Login);
        assert!(!ran);
        assert_eq!(app.navigator.current_route(), Route::Login);
    }

    #[tokio::test]
    async fn test_admin_page_refuses_student() {
        let app = app();
        app.store.wait_rehydrated().await;
        app.store.set_auth(student(), "tok".into());

        let err = app
            .ensure_allowed(Route::AdminUsers, PageGate::admin())
            .await
            .unwrap_err();
        assert_eq!(err.downcast_ref::<Redirected>().map(|r| r.to.clone()), Some(Route::Home));

        app.ensure_allowed(Route::Settings, PageGate::authenticated())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_guarded_page_returns_load_result() {
        let app = app();
        app.store.wait_rehydrated().await;
        app.store.set_auth(student(), "tok".into());

        let value = app
            .guarded(Route::MyComments, PageGate::authenticated(), || async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }
}
