use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Moderation state controlling public visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfessionStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for ConfessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConfessionStatus::Pending => "pending",
            ConfessionStatus::Approved => "approved",
            ConfessionStatus::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

impl FromStr for ConfessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ConfessionStatus::Pending),
            "approved" => Ok(ConfessionStatus::Approved),
            "rejected" => Ok(ConfessionStatus::Rejected),
            other => Err(format!("unknown confession status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub content: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confession {
    pub id: String,
    pub content: String,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub reactions: BTreeMap<String, u64>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub status: ConfessionStatus,
}

impl Confession {
    pub fn reaction_count(&self, emoji: &str) -> u64 {
        self.reactions.get(emoji).copied().unwrap_or(0)
    }
}
