// Append-only text logs: the spam-block log and the classifier usage log.
//
// Both are plain files meant to be read by a human (or tailed by the admin
// log viewer). Nothing here ever truncates or rotates them.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use tokio::io::AsyncWriteExt;

/// Timestamp format shared by both logs. Entries are written in the wall
/// clock of whatever zone `at` carries; callers pass server-local time.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One line in the spam-block log.
pub fn format_spam_entry<Tz>(at: DateTime<Tz>, username: &str, email: &str, score: f64) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "{} - Blocked user: {} | {} | Score: {:.2}\n",
        at.format(TIMESTAMP_FORMAT),
        username,
        email,
        score
    )
}

/// One line in the classifier usage log.
pub fn format_usage_entry<Tz>(at: DateTime<Tz>, tokens_used: u64, input: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "{} | Used {} tokens for input: {}\n",
        at.format(TIMESTAMP_FORMAT),
        tokens_used,
        input
    )
}

/// A file opened in append mode for every write.
#[derive(Debug, Clone)]
pub struct AppendLog {
    path: PathBuf,
}

impl AppendLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `entry` as-is, creating the file (and parent directories) if needed.
    pub async fn append(&self, entry: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create directory for log: {}", self.path.display())
                })?;
            }
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open log {}", self.path.display()))?;
        file.write_all(entry.as_bytes())
            .await
            .with_context(|| format!("Failed to append to log {}", self.path.display()))?;
        file.flush().await?;
        Ok(())
    }

    /// The newest `limit` non-empty lines, newest first.
    ///
    /// A log that doesn't exist yet reads as empty.
    pub async fn recent(&self, limit: usize) -> Result<Vec<String>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read log {}", self.path.display()))
            }
        };

        Ok(contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .rev()
            .take(limit)
            .map(str::to_string)
            .collect())
    }
}
