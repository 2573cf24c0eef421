// TextGenerator backed by the Claude client.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use huddle_core::config::Config;
use huddle_core::decorate::{OfflineGenerator, TextGenerator};
use huddle_core::grouping::Theme;

use crate::client::LlmClient;
use crate::prompt;

pub struct LlmGenerator {
    client: LlmClient,
    team_names_max_tokens: u32,
    announcement_max_tokens: u32,
}

impl LlmGenerator {
    pub fn new(client: LlmClient, team_names_max_tokens: u32, announcement_max_tokens: u32) -> Self {
        Self {
            client,
            team_names_max_tokens,
            announcement_max_tokens,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            LlmClient::from_config(config),
            config.llm.team_names_max_tokens,
            config.llm.announcement_max_tokens,
        )
    }
}

#[async_trait]
impl TextGenerator for LlmGenerator {
    async fn team_names(&self, count: usize, theme: Theme) -> anyhow::Result<Vec<String>> {
        let reply = self
            .client
            .complete(
                &prompt::system_prompt(),
                &prompt::team_names_prompt(count, theme),
                self.team_names_max_tokens,
            )
            .await?;
        prompt::parse_team_names(&reply)
    }

    async fn winner_announcement(&self, name: &str) -> anyhow::Result<String> {
        self.client
            .complete(
                &prompt::system_prompt(),
                &prompt::announcement_prompt(name),
                self.announcement_max_tokens,
            )
            .await
    }
}

/// The generator the application should use: Claude when an API key is
/// configured, the offline fallbacks otherwise.
pub fn generator_from_config(config: &Config) -> Arc<dyn TextGenerator> {
    let generator = LlmGenerator::from_config(config);
    if generator.client.is_active() {
        info!("Text generation enabled (model {})", config.llm.model);
        Arc::new(generator)
    } else {
        info!("No API key configured; using fallback team names and announcements");
        Arc::new(OfflineGenerator)
    }
}
