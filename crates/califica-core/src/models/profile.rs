use serde::{Deserialize, Serialize};

use super::user::User;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct UserStats {
    #[serde(rename = "totalComments")]
    pub total_comments: usize,
}

/// What the profile page shows: the account plus activity counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ProfileData {
    pub user: User,
    pub stats: UserStats,
}
