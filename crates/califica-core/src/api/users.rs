//! Account management for admins (`/users`).

use anyhow::{Context, Result};
use tracing::info;

use super::ApiClient;
use crate::models::{User, UserUpdate};
use crate::validate;

/// Path used to look a user up: by email when the query looks like one,
/// otherwise by id.
fn lookup_path(query: &str) -> String {
    if query.contains('@') {
        format!("/users/email/{}", query)
    } else {
        format!("/users/{}", query)
    }
}

pub struct UsersService {
    api: ApiClient,
}

impl ApiClient {
    pub fn users(&self) -> UsersService {
        UsersService { api: self.clone() }
    }
}

impl UsersService {
    pub async fn find(&self, query: &str) -> Result<User> {
        let query = query.trim();
        validate::require("Email or id", query)?;
        self.api
            .get(&lookup_path(query))
            .await
            .with_context(|| format!("User '{}' not found", query))
    }

    pub async fn update(&self, id: &str, update: &UserUpdate) -> Result<User> {
        validate::require("Name", &update.name)?;
        validate::require("Email", &update.email)?;
        let user: User = self
            .api
            .patch(&format!("/users/{}", id), update)
            .await
            .with_context(|| format!("Failed to update user {}", id))?;
        info!(user_id = %id, role = %user.role, "User updated");
        Ok(user)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.api
            .delete(&format!("/users/{}", id))
            .await
            .with_context(|| format!("Failed to delete user {}", id))?;
        info!(user_id = %id, "User deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_path() {
        assert_eq!(lookup_path("ana@uni.edu"), "/users/email/ana@uni.edu");
        assert_eq!(lookup_path("65f1c0"), "/users/65f1c0");
    }
}
