use chrono::{DateTime, Utc};
use git2::Oid;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SCHEMA_VERSION: u32 = 1;

/// A resolved author identity. Two identities are the same author when their
/// emails match, regardless of the display name on the commit.
#[derive(Debug, Clone, Eq)]
pub struct Identity {
    pub email: String,
    pub name: String,
}

impl Identity {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
        }
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.email == other.email
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Flattened commit record cached by the timeline so that days never hold
/// live backend handles.
#[derive(Debug, Clone)]
pub struct CommitInfo {
    pub id: Oid,
    pub timestamp: i64,
    pub author_name: String,
    pub author_email: String,
    pub summary: String,
}

/// One contiguous run of lines attributed to a single commit.
#[derive(Debug, Clone)]
pub struct BlameHunk {
    pub timestamp: i64,
    pub author_name: String,
    pub author_email: String,
    pub lines: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayRecord {
    #[serde(rename = "_type")]
    pub record_type: &'static str,
    pub day_timestamp: i64,
    pub date: String,
    pub commit_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommitRecord {
    #[serde(rename = "_type")]
    pub record_type: &'static str,
    pub id: String,
    pub timestamp: i64,
    pub day_of_week: String,
    pub hour_of_day: u32,
    pub author_name: String,
    pub author_email: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRecord {
    pub author_name: String,
    pub author_email: String,
    pub lines: u64,
    pub share: f64,
    pub mean_age_seconds: u64,
    pub stddev_age_seconds: u64,
    pub first_commit_timestamp: Option<i64>,
    pub last_commit_timestamp: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TreeRecord {
    #[serde(rename = "_type")]
    pub record_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_timestamp: Option<i64>,
    pub lines: u64,
    pub files: usize,
    pub mean_age_seconds: u64,
    pub stddev_age_seconds: u64,
    pub first_commit_timestamp: Option<i64>,
    pub last_commit_timestamp: Option<i64>,
    pub stocks: Vec<StockRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    #[serde(rename = "_type")]
    pub record_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_timestamp: Option<i64>,
    pub path: String,
    pub lines: u64,
    pub mean_age_seconds: u64,
    pub stddev_age_seconds: u64,
    pub first_commit_timestamp: Option<i64>,
    pub last_commit_timestamp: Option<i64>,
    pub stocks: Vec<StockRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub repository_path: String,
    pub reference: String,
    pub offset_timestamp: i64,
    pub tree: TreeRecord,
    pub files: Vec<FileRecord>,
}
