// Claude-backed text generation for team names and winner announcements.

pub mod client;
pub mod generator;
pub mod prompt;

pub use client::{ClaudeClient, LlmClient};
pub use generator::{generator_from_config, LlmGenerator};
