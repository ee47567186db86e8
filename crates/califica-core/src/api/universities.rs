//! Universities (`/universities`).

use anyhow::{Context, Result};

use super::ApiClient;
use crate::models::{NewUniversity, University, UniversityUpdate};
use crate::validate;

pub struct UniversitiesService {
    api: ApiClient,
}

impl ApiClient {
    pub fn universities(&self) -> UniversitiesService {
        UniversitiesService { api: self.clone() }
    }
}

impl UniversitiesService {
    pub async fn list(&self) -> Result<Vec<University>> {
        self.api
            .get("/universities")
            .await
            .context("Failed to fetch universities")
    }

    pub async fn get(&self, id: &str) -> Result<University> {
        self.api
            .get(&format!("/universities/{}", id))
            .await
            .with_context(|| format!("Failed to fetch university {}", id))
    }

    pub async fn create(&self, data: &NewUniversity) -> Result<University> {
        validate::require("Name", &data.name)?;
        self.api
            .post("/universities", data)
            .await
            .context("Failed to create university")
    }

    pub async fn update(&self, id: &str, update: &UniversityUpdate) -> Result<University> {
        self.api
            .patch(&format!("/universities/{}", id), update)
            .await
            .with_context(|| format!("Failed to update university {}", id))
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        self.api
            .delete(&format!("/universities/{}", id))
            .await
            .with_context(|| format!("Failed to delete university {}", id))
    }
}
