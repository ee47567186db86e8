//! Dashboard counts for the admin area.

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

use super::ApiClient;
use crate::models::AdminStats;

pub struct AdminService {
    api: ApiClient,
}

impl ApiClient {
    pub fn admin(&self) -> AdminService {
        AdminService { api: self.clone() }
    }
}

impl AdminService {
    /// Size of each collection. The four lists are fetched concurrently and
    /// any failure fails the whole call.
    pub async fn stats(&self) -> Result<AdminStats> {
        let (users, professors, universities, comments) = futures::try_join!(
            self.count("/users"),
            self.count("/professors"),
            self.count("/universities"),
            self.count("/comments"),
        )?;

        debug!(users, professors, universities, comments, "Fetched admin stats");
        Ok(AdminStats {
            total_users: users,
            total_professors: professors,
            total_universities: universities,
            total_comments: comments,
        })
    }

    async fn count(&self, path: &str) -> Result<usize> {
        let body: Value = self
            .api
            .get(path)
            .await
            .with_context(|| format!("Failed to fetch {}", path))?;
        Ok(collection_len(&body))
    }
}

/// Length of a bare array or of a `{data: [...]}` wrapper.
fn collection_len(body: &Value) -> usize {
    body.as_array()
        .or_else(|| body.get("data").and_then(Value::as_array))
        .map(Vec::len)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collection_len() {
        assert_eq!(collection_len(&json!([1, 2, 3])), 3);
        assert_eq!(collection_len(&json!({"data": [1]})), 1);
        assert_eq!(collection_len(&json!({})), 0);
    }
}
