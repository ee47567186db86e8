//! Utility functions for text and date formatting.

pub mod format;

pub use format::{contains_ignore_case, format_date, format_rating, stars, truncate_string};
