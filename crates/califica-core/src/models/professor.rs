use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::university::UniversityRef;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Professor {
    pub id: String,
    pub name: String,
    pub department: Option<String>,
    pub bio: Option<String>,
    #[serde(rename = "universityId", default)]
    pub university_id: Option<String>,
    #[serde(default)]
    pub university: Option<UniversityRef>,
    #[serde(rename = "averageRating", default)]
    pub average_rating: Option<f64>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Professor {
    /// The university this professor belongs to, preferring the embedded record.
    pub fn university_key(&self) -> Option<&str> {
        self.university
            .as_ref()
            .map(|u| u.id.as_str())
            .or(self.university_id.as_deref())
    }

    pub fn university_name(&self) -> Option<&str> {
        self.university.as_ref().map(|u| u.name.as_str())
    }

    /// Rating to display: the server average when known, otherwise the mean
    /// of the comments already loaded, otherwise 0.
    pub fn display_rating(&self, comments: &[ProfessorComment]) -> f64 {
        if let Some(avg) = self.average_rating {
            return avg;
        }
        if comments.is_empty() {
            return 0.0;
        }
        let sum: f64 = comments.iter().map(|c| f64::from(c.rating)).sum();
        sum / comments.len() as f64
    }
}

/// Aggregate rating for one professor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Rating {
    #[serde(default)]
    pub average: f64,
    #[serde(default)]
    pub count: u32,
}

/// Who wrote a comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct CommentAuthor {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// A comment as shown on a professor's page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ProfessorComment {
    pub id: String,
    pub content: String,
    /// 1-5; 0 when the server has no rating.
    pub rating: u8,
    pub professor_id: String,
    pub user_id: String,
    pub author: Option<CommentAuthor>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewProfessor {
    pub name: String,
    pub department: String,
    /// University id.
    pub university: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfessorUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university: Option<String>,
}

impl ProfessorUpdate {
    /// Build an update containing only the fields that differ from `current`.
    pub fn diff(current: &Professor, name: &str, department: &str, university: &str) -> Self {
        Self {
            name: (name != current.name).then(|| name.to_string()),
            department: (Some(department) != current.department.as_deref())
                .then(|| department.to_string()),
            university: (Some(university) != current.university_key())
                .then(|| university.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.department.is_none() && self.university.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn professor() -> Professor {
        serde_json::from_str(
            r#"{"id":"p1","name":"Ana Torres","department":"Física","universityId":"un1",
                "university":{"id":"un1","name":"UdeC","city":"Concepción","country":"Chile"},
                "createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"}"#,
        )
        .expect("parse professor")
    }

    fn comment(rating: u8) -> ProfessorComment {
        ProfessorComment {
            id: format!("c{}", rating),
            content: "ok".into(),
            rating,
            professor_id: "p1".into(),
            user_id: "u1".into(),
            author: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_university_key_prefers_embedded() {
        let mut p = professor();
        p.university_id = Some("stale".into());
        assert_eq!(p.university_key(), Some("un1"));
        p.university = None;
        assert_eq!(p.university_key(), Some("stale"));
    }

    #[test]
    fn test_display_rating_fallbacks() {
        let mut p = professor();
        assert_eq!(p.display_rating(&[]), 0.0);
        assert_eq!(p.display_rating(&[comment(4), comment(5)]), 4.5);
        p.average_rating = Some(3.2);
        assert_eq!(p.display_rating(&[comment(5)]), 3.2);
    }

    #[test]
    fn test_professor_update_diff() {
        let p = professor();
        let update = ProfessorUpdate::diff(&p, "Ana Torres", "Química", "un1");
        assert_eq!(
            update,
            ProfessorUpdate {
                department: Some("Química".into()),
                ..Default::default()
            }
        );
        assert!(ProfessorUpdate::diff(&p, "Ana Torres", "Física", "un1").is_empty());
    }
}
