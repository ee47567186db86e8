//! The signed-in user's profile and account settings (`/users/me`, `/users/:id`).

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::ApiClient;
use crate::auth::AuthStore;
use crate::models::{ProfileData, User, UserStats};
use crate::validate;

#[derive(Serialize)]
struct ProfileChanges<'a> {
    name: &'a str,
    email: &'a str,
}

#[derive(Serialize)]
struct PasswordChange<'a> {
    password: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub user: User,
    /// The server sends a verification email to the new address.
    pub email_changed: bool,
}

/// Count comments in whatever shape `/comments/me` returns.
fn count_comments(body: &Value) -> usize {
    if let Some(total) = body.get("total").and_then(Value::as_u64) {
        if total > 0 {
            return total as usize;
        }
    }
    if let Some(data) = body.get("data").and_then(Value::as_array) {
        return data.len();
    }
    body.as_array().map(Vec::len).unwrap_or(0)
}

pub struct ProfileService {
    api: ApiClient,
}

impl ApiClient {
    pub fn profile(&self) -> ProfileService {
        ProfileService { api: self.clone() }
    }
}

impl ProfileService {
    /// The account plus a comment count. The count is best-effort and is 0
    /// when it cannot be fetched.
    pub async fn profile(&self) -> Result<ProfileData> {
        let user: User = self
            .api
            .get("/users/me")
            .await
            .context("Failed to fetch profile")?;

        let total_comments = match self.api.get::<Value>("/comments/me").await {
            Ok(body) => count_comments(&body),
            Err(e) => {
                debug!(error = %e, "Comment count unavailable");
                0
            }
        };

        Ok(ProfileData {
            user,
            stats: UserStats { total_comments },
        })
    }

    /// Change name and email, then refresh the user held by the store.
    pub async fn update_profile(&self, store: &AuthStore, name: &str, email: &str) -> Result<ProfileUpdate> {
        validate::require("Name", name)?;
        validate::require("Email", email)?;
        let current = signed_in(store)?;

        let user: User = self
            .api
            .patch(&format!("/users/{}", current.id), &ProfileChanges { name, email })
            .await
            .context("Failed to update profile")?;

        let email_changed = email != current.email;
        store.update_user(user.clone());
        info!(user_id = %user.id, email_changed, "Profile updated");

        Ok(ProfileUpdate { user, email_changed })
    }

    pub async fn change_password(&self, store: &AuthStore, password: &str, confirmation: &str) -> Result<()> {
        validate::new_password(password, confirmation)?;
        let current = signed_in(store)?;
        self.api
            .patch_unit(&format!("/users/{}", current.id), &PasswordChange { password })
            .await
            .context("Failed to change password")?;
        info!(user_id = %current.id, "Password changed");
        Ok(())
    }

    /// Permanently delete the account and end the session.
    pub async fn delete_account(&self, store: &AuthStore, confirmation: &str) -> Result<()> {
        validate::delete_confirmation(confirmation)?;
        let current = signed_in(store)?;
        self.api
            .delete(&format!("/users/{}", current.id))
            .await
            .context("Failed to delete account")?;
        info!(user_id = %current.id, "Account deleted");
        store.logout();
        Ok(())
    }
}

fn signed_in(store: &AuthStore) -> Result<User> {
    store
        .session()
        .is_authenticated()
        .then(|| store.user())
        .flatten()
        .ok_or_else(|| anyhow::anyhow!("Not signed in"))
}
