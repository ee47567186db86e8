//! REST API client and services for the rating platform.
//!
//! `ApiClient` sends requests to the configured base URL, attaching the
//! stored bearer token when it has an auth store. Each resource has a thin
//! service built from the client (`client.professors()`, `client.auth()`,
//! and so on).

pub mod admin;
pub mod auth;
pub mod client;
pub mod comments;
pub mod error;
pub mod professors;
pub mod profile;
pub mod universities;
pub mod users;

pub use admin::AdminService;
pub use auth::{AuthService, LoginOutcome, RegisterOutcome, Registration};
pub use client::{ApiClient, IgnoreUnauthorized, LogoutRedirect, UnauthorizedHandler};
pub use comments::CommentsService;
pub use error::{is_unauthorized, ApiError};
pub use professors::ProfessorsService;
pub use profile::{ProfileService, ProfileUpdate};
pub use universities::UniversitiesService;
pub use users::UsersService;
