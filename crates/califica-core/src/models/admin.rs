use serde::{Deserialize, Serialize};

/// Dashboard counters for administrators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct AdminStats {
    #[serde(rename = "totalUsers")]
    pub total_users: usize,
    #[serde(rename = "totalProfessors")]
    pub total_professors: usize,
    #[serde(rename = "totalUniversities")]
    pub total_universities: usize,
    #[serde(rename = "totalComments")]
    pub total_comments: usize,
}
