use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct University {
    pub id: String,
    pub name: String,
    pub country: Option<String>,
    pub city: Option<String>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl University {
    /// "City, Country" with missing parts skipped.
    pub fn location(&self) -> Option<String> {
        let parts: Vec<&str> = [self.city.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// Summary of a university embedded in a professor record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct UniversityRef {
    pub id: String,
    pub name: String,
    pub city: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NewUniversity {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

/// Partial update; only fields that are `Some` are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UniversityUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl UniversityUpdate {
    /// Build an update containing only the fields that differ from `current`.
    pub fn diff(current: &University, name: &str, country: &str, city: &str) -> Self {
        Self {
            name: (name != current.name).then(|| name.to_string()),
            country: (Some(country) != current.country.as_deref()).then(|| country.to_string()),
            city: (Some(city) != current.city.as_deref()).then(|| city.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.country.is_none() && self.city.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uni() -> University {
        University {
            id: "un1".into(),
            name: "Universidad de Chile".into(),
            country: Some("Chile".into()),
            city: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_location() {
        assert_eq!(uni().location().as_deref(), Some("Chile"));
        let mut u = uni();
        u.city = Some("Santiago".into());
        assert_eq!(u.location().as_deref(), Some("Santiago, Chile"));
        u.city = None;
        u.country = None;
        assert_eq!(u.location(), None);
    }

    #[test]
    fn test_update_diff_only_changed_fields() {
        let update = UniversityUpdate::diff(&uni(), "Universidad de Chile", "Chile", "Santiago");
        assert_eq!(update.name, None);
        assert_eq!(update.country, None);
        assert_eq!(update.city.as_deref(), Some("Santiago"));

        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "city": "Santiago" }));
    }

    #[test]
    fn test_update_diff_blank_vs_missing() {
        let update = UniversityUpdate::diff(&uni(), "Universidad de Chile", "Chile", "");
        // Blank city differs from a missing one, matching what the edit form submits
        assert_eq!(update.city.as_deref(), Some(""));
        assert!(!update.is_empty());
    }
}
