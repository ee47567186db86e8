use chrono::{DateTime, Utc};

/// Case-insensitive substring match. An empty needle matches everything.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format a timestamp for display, or a dash when missing
pub fn format_date(date: Option<&DateTime<Utc>>) -> String {
    match date {
        Some(dt) => dt.format("%d/%m/%Y").to_string(),
        None => "-".to_string(),
    }
}

/// One decimal place, as shown next to star ratings.
pub fn format_rating(rating: f64) -> String {
    format!("{:.1}", rating)
}

/// Five stars, filled up to the rounded rating.
pub fn stars(rating: f64) -> String {
    let filled = rating.round().clamp(0.0, 5.0) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("García Márquez", "garcía"));
        assert!(contains_ignore_case("Física", ""));
        assert!(!contains_ignore_case("Química", "bio"));
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hola", 10), "Hola");
        assert_eq!(truncate_string("Hola mundo", 7), "Hola...");
        assert_eq!(truncate_string("Ñandú", 5), "Ñandú");
    }

    #[test]
    fn test_format_date() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        assert_eq!(format_date(Some(&dt)), "09/03/2024");
        assert_eq!(format_date(None), "-");
    }

    #[test]
    fn test_stars() {
        assert_eq!(stars(0.0), "☆☆☆☆☆");
        assert_eq!(stars(3.6), "★★★★☆");
        assert_eq!(stars(9.0), "★★★★★");
        assert_eq!(format_rating(4.26), "4.3");
    }
}
