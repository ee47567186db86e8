//! Login, registration and email verification (`/auth`).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{ApiClient, ApiError};
use crate::auth::AuthStore;
use crate::config::LoginPolicy;
use crate::models::{User, UserRole};
use crate::validate;

#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: Option<String>,
    #[serde(rename = "accessToken")]
    access_token: Option<String>,
    user: User,
    #[serde(rename = "emailVerified")]
    email_verified: Option<bool>,
}

impl AuthResponse {
    fn bearer(&self) -> Option<&str> {
        self.token
            .as_deref()
            .or(self.access_token.as_deref())
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    message: Option<String>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Signup form contents.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// The session was stored; the user is authenticated.
    LoggedIn(User),
    /// The account exists but must verify its email first.
    EmailNotVerified { email: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegisterOutcome {
    pub user: User,
    /// True when the response was accepted as a login under the active policy.
    pub logged_in: bool,
}

/// What to do with a login response under a policy.
#[derive(Debug, PartialEq)]
enum Decision {
    Accept(String),
    Unverified,
    NoToken,
}

fn decide(policy: LoginPolicy, response: &AuthResponse) -> Decision {
    match policy {
        LoginPolicy::RequireVerifiedEmail => match (response.email_verified, response.bearer()) {
            (Some(true), Some(token)) => Decision::Accept(token.to_string()),
            // Without a token the server is telling us the account is not usable yet
            _ => Decision::Unverified,
        },
        LoginPolicy::AcceptToken => match response.bearer() {
            Some(token) => Decision::Accept(token.to_string()),
            None => Decision::NoToken,
        },
    }
}

pub struct AuthService {
    api: ApiClient,
}

impl ApiClient {
    pub fn auth(&self) -> AuthService {
        AuthService { api: self.clone() }
    }
}

impl AuthService {
    /// Log in and, if the response is acceptable under `policy`, store the session.
    pub async fn login(
        &self,
        store: &AuthStore,
        policy: LoginPolicy,
        email: &str,
        password: &str,
    ) -> Result<LoginOutcome> {
        validate::require("Email", email)?;
        validate::require("Password", password)?;

        let response: AuthResponse = self
            .api
            .post("/auth/login", &LoginRequest { email, password })
            .await
            .context("Login failed")?;

        match decide(policy, &response) {
            Decision::Accept(token) => {
                info!(user_id = %response.user.id, "Logged in");
                store.set_auth(response.user.clone(), token);
                Ok(LoginOutcome::LoggedIn(response.user))
            }
            Decision::Unverified => {
                warn!(email = %email, "Login refused, email not verified");
                Ok(LoginOutcome::EmailNotVerified {
                    email: email.to_string(),
                })
            }
            Decision::NoToken => Err(ApiError::InvalidResponse(
                "login response carried no access token".to_string(),
            )
            .into()),
        }
    }

    /// Create an account. The password confirmation is checked locally first.
    pub async fn register(
        &self,
        store: &AuthStore,
        policy: LoginPolicy,
        registration: &Registration,
        confirmation: &str,
    ) -> Result<RegisterOutcome> {
        validate::require("Name", &registration.name)?;
        validate::require("Email", &registration.email)?;
        validate::new_password(&registration.password, confirmation)?;

        let response: AuthResponse = self
            .api
            .post("/auth/register", registration)
            .await
            .context("Registration failed")?;

        let logged_in = match decide(policy, &response) {
            Decision::Accept(token) => {
                store.set_auth(response.user.clone(), token);
                true
            }
            Decision::Unverified | Decision::NoToken => false,
        };
        info!(user_id = %response.user.id, logged_in, "Registered");

        Ok(RegisterOutcome {
            user: response.user,
            logged_in,
        })
    }

    /// The user the current token belongs to.
    pub async fn me(&self) -> Result<User> {
        self.api.get("/auth/me").await.context("Failed to fetch current user")
    }

    /// Confirm an email address with the token from the verification link.
    pub async fn verify_email(&self, token: &str) -> Result<Option<String>> {
        validate::require("Verification token", token)?;
        let response: MessageResponse = self
            .api
            .get_with_query("/auth/verify-email", &[("token", token)])
            .await
            .context("Email verification failed")?;
        Ok(response.message)
    }

    pub async fn resend_verification(&self, email: &str) -> Result<Option<String>> {
        validate::require("Email", email)?;
        let response: MessageResponse = self
            .api
            .post("/auth/resend-verification", &serde_json::json!({ "email": email }))
            .await
            .context("Failed to resend verification email")?;
        Ok(response.message)
    }
}
