//! The signed-in user's comments and admin moderation (`/comments`).

use anyhow::{Context, Result};

use super::ApiClient;
use crate::models::{Comment, CommentList, CommentUpdate};
use crate::validate;

pub struct CommentsService {
    api: ApiClient,
}

impl ApiClient {
    pub fn comments(&self) -> CommentsService {
        CommentsService { api: self.clone() }
    }
}

impl CommentsService {
    /// Comments written by the signed-in user.
    pub async fn mine(&self) -> Result<Vec<Comment>> {
        let list: Option<CommentList> = self
            .api
            .get("/comments/me")
            .await
            .context("Failed to fetch your comments")?;
        Ok(list.map(CommentList::into_vec).unwrap_or_default())
    }

    /// Every comment on the platform (admin).
    pub async fn all(&self) -> Result<Vec<Comment>> {
        let list: Option<CommentList> = self
            .api
            .get("/comments")
            .await
            .context("Failed to fetch comments")?;
        Ok(list.map(CommentList::into_vec).unwrap_or_default())
    }

    pub async fn update(&self, id: &str, update: &CommentUpdate) -> Result<Comment> {
        if let Some(rating) = update.rating {
            validate::rating(rating)?;
        }
        if let Some(ref content) = update.content {
            validate::require("Comment", content)?;
        }
        self.api
            .patch(&format!("/comments/{}", id), update)
            .await
            .with_context(|| format!("Failed to update comment {}", id))
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.api
            .delete(&format!("/comments/{}", id))
            .await
            .with_context(|| format!("Failed to delete comment {}", id))
    }
}
