//! Application routes and navigation.
//!
//! Front ends implement [`Navigator`] so the core can force a redirect
//! (for example to `/login` after a 401) without knowing how pages are shown.

use std::sync::Mutex;

use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Signup,
    VerifyEmail,
    Professors,
    Professor(String),
    Universities,
    University(String),
    Profile,
    MyComments,
    Settings,
    Admin,
    AdminUsers,
    AdminProfessors,
    AdminUniversities,
    AdminComments,
    NotFound(String),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Signup => "/signup".to_string(),
            Route::VerifyEmail => "/auth/verify".to_string(),
            Route::Professors => "/professors".to_string(),
            Route::Professor(id) => format!("/professors/{}", id),
            Route::Universities => "/universities".to_string(),
            Route::University(id) => format!("/universities/{}", id),
            Route::Profile => "/profile".to_string(),
            Route::MyComments => "/profile/comments".to_string(),
            Route::Settings => "/settings".to_string(),
            Route::Admin => "/admin".to_string(),
            Route::AdminUsers => "/admin/users".to_string(),
            Route::AdminProfessors => "/admin/professors".to_string(),
            Route::AdminUniversities => "/admin/universities".to_string(),
            Route::AdminComments => "/admin/comments".to_string(),
            Route::NotFound(path) => path.clone(),
        }
    }

    /// Parse a path, ignoring any query string and trailing slash.
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Route::Home,
            ["login"] => Route::Login,
            ["signup"] => Route::Signup,
            ["auth", "verify"] => Route::VerifyEmail,
            ["professors"] => Route::Professors,
            ["professors", id] => Route::Professor(id.to_string()),
            ["universities"] => Route::Universities,
            ["universities", id] => Route::University(id.to_string()),
            ["profile"] => Route::Profile,
            ["profile", "comments"] => Route::MyComments,
            ["settings"] => Route::Settings,
            ["admin"] => Route::Admin,
            ["admin", "users"] => Route::AdminUsers,
            ["admin", "professors"] => Route::AdminProfessors,
            ["admin", "universities"] => Route::AdminUniversities,
            ["admin", "comments"] => Route::AdminComments,
            _ => Route::NotFound(path.to_string()),
        }
    }

    /// Pages where the user is deliberately authenticating.
    pub fn is_public_auth(&self) -> bool {
        matches!(self, Route::Login | Route::Signup)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

pub trait Navigator: Send + Sync {
    fn current_route(&self) -> Route;

    /// Hard navigation: the current page is abandoned.
    fn navigate(&self, route: Route);
}

/// Navigator that only records where it has been.
pub struct MemoryNavigator {
    state: Mutex<NavState>,
}

struct NavState {
    current: Route,
    history: Vec<Route>,
}

impl MemoryNavigator {
    pub fn new(start: Route) -> Self {
        Self {
            state: Mutex::new(NavState {
                current: start,
                history: Vec::new(),
            }),
        }
    }

    /// Routes navigated to, oldest first. The starting route is not included.
    pub fn history(&self) -> Vec<Route> {
        self.lock().history.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NavState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Navigator for MemoryNavigator {
    fn current_route(&self) -> Route {
        self.lock().current.clone()
    }

    fn navigate(&self, route: Route) {
        debug!(to = %route, "Navigating");
        let mut state = self.lock();
        state.history.push(route.clone());
        state.current = route;
    }
}
