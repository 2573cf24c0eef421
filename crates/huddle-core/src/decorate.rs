// Optional text decoration: themed team names and winner announcements.
//
// Generation is best effort. Every call is bounded by a timeout and every
// failure resolves to a deterministic fallback, so callers never see an error.

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::grouping::{fallback_name, fallback_names, Theme};

/// Source of decorative text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produce `count` team names in the style of `theme`.
    async fn team_names(&self, count: usize, theme: Theme) -> anyhow::Result<Vec<String>>;

    /// Produce a one-sentence announcement for `name` winning a prize.
    async fn winner_announcement(&self, name: &str) -> anyhow::Result<String>;
}

/// Generator used when no text-generation service is configured. Always
/// returns the fallback text.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGenerator;

#[async_trait]
impl TextGenerator for OfflineGenerator {
    async fn team_names(&self, count: usize, _theme: Theme) -> anyhow::Result<Vec<String>> {
        Ok(fallback_names(count))
    }

    async fn winner_announcement(&self, name: &str) -> anyhow::Result<String> {
        Ok(empty_announcement(name))
    }
}

/// Announcement used when generation fails.
pub fn failed_announcement(name: &str) -> String {
    format!("Congratulations, {name}!")
}

/// Announcement used when generation succeeds with nothing to say.
pub fn empty_announcement(name: &str) -> String {
    format!("Congratulations, {name}! You are the winner!")
}

/// Ask `generator` for `count` names, returning exactly `count` entries.
/// Missing or blank slots are filled with their fallback name.
pub async fn team_names_or_fallback(
    generator: &dyn TextGenerator,
    count: usize,
    theme: Theme,
    limit: Duration,
) -> Vec<String> {
    let names = match tokio::time::timeout(limit, generator.team_names(count, theme)).await {
        Ok(Ok(names)) => names,
        Ok(Err(e)) => {
            warn!("Team name generation failed: {e:#}");
            return fallback_names(count);
        }
        Err(_) => {
            warn!("Team name generation timed out after {limit:?}");
            return fallback_names(count);
        }
    };

    (0..count)
        .map(|i| match names.get(i).map(|n| n.trim()) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => fallback_name(i),
        })
        .collect()
}

/// Ask `generator` for an announcement of `name`'s win.
pub async fn announcement_or_fallback(
    generator: &dyn TextGenerator,
    name: &str,
    limit: Duration,
) -> String {
    match tokio::time::timeout(limit, generator.winner_announcement(name)).await {
        Ok(Ok(text)) => {
            let text = text.trim();
            if text.is_empty() {
                empty_announcement(name)
            } else {
                text.to_string()
            }
        }
        Ok(Err(e)) => {
            warn!("Announcement generation failed: {e:#}");
            failed_announcement(name)
        }
        Err(_) => {
            warn!("Announcement generation timed out after {limit:?}");
            failed_announcement(name)
        }
    }
}
