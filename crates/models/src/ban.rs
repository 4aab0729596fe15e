//! Ban rows, persisted as unquoted CSV lines `email,ban_reason,ban_at`.

use serde::{Deserialize, Serialize};

pub const BAN_CSV_HEADER: &str = "email,ban_reason,ban_at";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ban {
    pub email: String,
    pub reason: String,
    pub banned_at: String,
}

impl Ban {
    /// Parse one data line; `None` for rows with fewer than three fields.
    pub fn parse_row(line: &str) -> Option<Ban> {
        let parts: Vec<&str> = line.trim().split(',').collect();
        if parts.len() < 3 {
            return None;
        }
        Some(Ban {
            email: parts[0].to_string(),
            reason: parts[1].to_string(),
            banned_at: parts[2].to_string(),
        })
    }

    pub fn to_row(&self) -> String {
        format!("{},{},{}", self.email, sanitize_reason(&self.reason), self.banned_at)
    }
}

/// Email column of a raw data line, used for lookups that must tolerate short rows.
pub fn row_email(line: &str) -> &str {
    line.trim().split(',').next().unwrap_or_default()
}

/// The format has no quoting, so commas in free text become spaces.
pub fn sanitize_reason(reason: &str) -> String {
    reason.replace(|c: char| c == ',' || c == '\r' || c == '\n', " ")
}
