//! Core library for califica, a client for a professor-rating platform.
//!
//! This crate provides:
//! - Persisted authentication state with explicit rehydration (`auth`)
//! - REST API client and per-resource services (`api`)
//! - Access gating for protected pages (`auth::gate`, `routes`)
//! - In-memory search and pagination for list pages (`listing`)
//! - Configuration, validation and formatting helpers

pub mod api;
pub mod auth;
pub mod config;
pub mod listing;
pub mod models;
pub mod routes;
pub mod utils;
pub mod validate;
