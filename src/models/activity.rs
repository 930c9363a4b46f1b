use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use chrono::Utc;

use crate::errors::AppError;

/// Distinguishes entries typed in by the user from ones logged by the desktop tracker.
#[derive(sqlx::Type, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ActivityType {
    Manual,
    App,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Manual => "MANUAL",
            ActivityType::App => "APP",
        }
    }

    pub fn allows_memo(&self) -> bool {
        matches!(self, ActivityType::Manual)
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MANUAL" => Ok(ActivityType::Manual),
            "APP" => Ok(ActivityType::App),
            _ => Err(AppError::BadRequest("Type must be either MANUAL or APP".to_string())),
        }
    }
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct ActivityRecord {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub record_type: ActivityType,
    pub start_time: chrono::DateTime<Utc>,
    pub end_time: chrono::DateTime<Utc>,
    pub duration_seconds: i64,
    pub memo: Option<String>,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
}
