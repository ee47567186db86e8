//! Professors and their ratings (`/professors`, `/comments/professor/:id`).

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use tracing::{debug, warn};

use super::ApiClient;
use crate::models::{
    CommentAuthor, NewComment, NewProfessor, Professor, ProfessorComment, ProfessorUpdate, Rating,
};
use crate::validate;

/// Maximum concurrent rating lookups when enriching a professor list.
const MAX_CONCURRENT_RATING_REQUESTS: usize = 8;

/// Comment as the API returns it - use ProfessorComment from models for domain code
#[derive(Debug, Clone, Deserialize)]
struct CommentApi {
    id: String,
    content: String,
    rating: Option<u8>,
    #[serde(rename = "professorId", default)]
    professor_id: String,
    #[serde(rename = "studentId", default)]
    student_id: String,
    student: Option<StudentApi>,
    #[serde(rename = "createdAt")]
    created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt")]
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
struct StudentApi {
    id: String,
    name: String,
    email: String,
}

impl CommentApi {
    fn into_domain(self) -> ProfessorComment {
        ProfessorComment {
            id: self.id,
            content: self.content,
            rating: self.rating.unwrap_or(0),
            professor_id: self.professor_id,
            user_id: self.student_id,
            author: self.student.map(|s| CommentAuthor {
                id: s.id,
                name: s.name,
                email: s.email,
            }),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

pub struct ProfessorsService {
    api: ApiClient,
}

impl ApiClient {
    pub fn professors(&self) -> ProfessorsService {
        ProfessorsService { api: self.clone() }
    }
}

impl ProfessorsService {
    /// All professors, each with its average rating attached.
    ///
    /// A rating that cannot be fetched is reported as 0; the list itself
    /// still loads.
    pub async fn list(&self) -> Result<Vec<Professor>> {
        let professors: Vec<Professor> = self
            .api
            .get("/professors")
            .await
            .context("Failed to fetch professors")?;

        debug!(count = professors.len(), "Fetching professor ratings");

        let enriched: Vec<Professor> = stream::iter(professors)
            .map(|mut professor| async move {
                let average = match self.rating(&professor.id).await {
                    Ok(rating) => rating.average,
                    Err(e) => {
                        warn!(professor_id = %professor.id, error = %e, "Rating lookup failed");
                        0.0
                    }
                };
                professor.average_rating = Some(average);
                professor
            })
            .buffered(MAX_CONCURRENT_RATING_REQUESTS)
            .collect()
            .await;

        Ok(enriched)
    }

    pub async fn get(&self, id: &str) -> Result<Professor> {
        self.api
            .get(&format!("/professors/{}", id))
            .await
            .with_context(|| format!("Failed to fetch professor {}", id))
    }

    pub async fn create(&self, data: &NewProfessor) -> Result<Professor> {
        validate::require("Name", &data.name)?;
        validate::require("University", &data.university)?;
        self.api
            .post("/professors", data)
            .await
            .context("Failed to create professor")
    }

    pub async fn update(&self, id: &str, update: &ProfessorUpdate) -> Result<Professor> {
        self.api
            .patch(&format!("/professors/{}", id), update)
            .await
            .with_context(|| format!("Failed to update professor {}", id))
    }

    /// Delete a professor. The server also removes their comments.
    pub async fn remove(&self, id: &str) -> Result<()> {
        self.api
            .delete(&format!("/professors/{}", id))
            .await
            .with_context(|| format!("Failed to delete professor {}", id))
    }

    pub async fn rating(&self, professor_id: &str) -> Result<Rating> {
        self.api
            .get(&format!("/comments/professor/{}/rating", professor_id))
            .await
    }

    pub async fn comments(&self, professor_id: &str) -> Result<Vec<ProfessorComment>> {
        let comments: Vec<CommentApi> = self
            .api
            .get(&format!("/comments/professor/{}/comments", professor_id))
            .await
            .with_context(|| format!("Failed to fetch comments for professor {}", professor_id))?;
        Ok(comments.into_iter().map(CommentApi::into_domain).collect())
    }

    /// Rate a professor (1-5 stars) with a text comment.
    pub async fn add_comment(
        &self,
        professor_id: &str,
        rating: u8,
        content: &str,
    ) -> Result<ProfessorComment> {
        let rating = validate::rating(rating)?;
        validate::require("Comment", content)?;
        let body = NewComment {
            content: content.to_string(),
            rating,
            professor: professor_id.to_string(),
        };
        let created: CommentApi = self
            .api
            .post("/comments", &body)
            .await
            .context("Failed to post comment")?;
        Ok(created.into_domain())
    }
}
