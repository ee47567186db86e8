//! Data models for the rating platform.
//!
//! - `User`, `UserRole`: accounts as issued by the server
//! - `University`, `Professor`: the rated entities
//! - `Comment`, `ProfessorComment`: star ratings with text
//! - `ProfileData`, `AdminStats`: aggregate views
//!
//! Request bodies (`New*`, `*Update`) serialize only the fields that are set.

pub mod admin;
pub mod comment;
pub mod professor;
pub mod profile;
pub mod university;
pub mod user;

pub use admin::AdminStats;
pub use comment::{Comment, CommentList, CommentProfessor, CommentStudent, CommentUpdate, NewComment};
pub use professor::{
    CommentAuthor, NewProfessor, Professor, ProfessorComment, ProfessorUpdate, Rating,
};
pub use profile::{ProfileData, UserStats};
pub use university::{NewUniversity, University, UniversityRef, UniversityUpdate};
pub use user::{User, UserRole, UserUpdate};
