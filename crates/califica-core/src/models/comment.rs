use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Professor summary embedded in a comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct CommentProfessor {
    pub id: String,
    pub name: String,
    pub department: Option<String>,
}

/// Student summary embedded in a comment (admin listings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct CommentStudent {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// A comment as returned by `/comments` and `/comments/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Comment {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(rename = "professorId", default)]
    pub professor_id: Option<String>,
    #[serde(rename = "studentId", default)]
    pub student_id: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub professor: Option<CommentProfessor>,
    #[serde(default)]
    pub student: Option<CommentStudent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewComment {
    pub content: String,
    pub rating: u8,
    /// Professor id; the server names this field `professor`.
    pub professor: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

/// Lists of comments come back either bare or wrapped in `{ "data": [...] }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CommentList {
    Bare(Vec<Comment>),
    Wrapped {
        #[serde(default)]
        data: Vec<Comment>,
    },
}

impl CommentList {
    pub fn into_vec(self) -> Vec<Comment> {
        match self {
            CommentList::Bare(v) => v,
            CommentList::Wrapped { data } => data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_list_shapes() {
        let bare: CommentList =
            serde_json::from_str(r#"[{"id":"c1","content":"Buen profe"}]"#).unwrap();
        assert_eq!(bare.into_vec().len(), 1);

        let wrapped: CommentList = serde_json::from_str(
            r#"{"data":[{"id":"c1","content":"a"},{"id":"c2","content":"b","rating":4}],"total":2}"#,
        )
        .unwrap();
        let list = wrapped.into_vec();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].rating, Some(4));
    }

    #[test]
    fn test_new_comment_wire_shape() {
        let body = NewComment {
            content: "Excelente".into(),
            rating: 5,
            professor: "p1".into(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"content": "Excelente", "rating": 5, "professor": "p1"})
        );
    }
}
