use std::env;
use std::str::FromStr;

use anyhow::Context;

use crate::services::llm::SamplingConfig;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://study_tutor.db?mode=rwc";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Ollama,
    Anthropic,
}

impl FromStr for LlmProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(LlmProvider::Ollama),
            "anthropic" => Ok(LlmProvider::Anthropic),
            other => Err(anyhow::anyhow!("Unknown LLM provider: {}", other)),
        }
    }
}

/// Runtime settings, read once from the environment (and `.env`) at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub provider: LlmProvider,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub sampling: SamplingConfig,
    /// Number of most recent messages sent to the model; `None` sends the full history.
    pub history_limit: Option<usize>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = SamplingConfig::default();

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            provider: match non_empty_var("LLM_PROVIDER") {
                Some(p) => p.parse()?,
                None => LlmProvider::Ollama,
            },
            model: non_empty_var("LLM_MODEL"),
            base_url: non_empty_var("LLM_BASE_URL"),
            anthropic_api_key: non_empty_var("ANTHROPIC_API_KEY"),
            sampling: SamplingConfig {
                temperature: parse_var("LLM_TEMPERATURE")?.unwrap_or(defaults.temperature),
                max_tokens: parse_var("LLM_MAX_TOKENS")?.unwrap_or(defaults.max_tokens),
                context_window: parse_var("LLM_CONTEXT_WINDOW")?
                    .unwrap_or(defaults.context_window),
            },
            history_limit: check_history_limit(parse_var("LLM_HISTORY_LIMIT")?)?,
        })
    }
}

fn check_history_limit(limit: Option<usize>) -> anyhow::Result<Option<usize>> {
    match limit {
        Some(0) => Err(anyhow::anyhow!(
            "LLM_HISTORY_LIMIT must be at least 1; unset it to send the full history"
        )),
        other => Ok(other),
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    non_empty_var(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("{} has an invalid value: {}", key, raw))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parsing() {
        assert_eq!("Ollama".parse::<LlmProvider>().unwrap(), LlmProvider::Ollama);
        assert_eq!(
            " anthropic ".parse::<LlmProvider>().unwrap(),
            LlmProvider::Anthropic
        );
        assert!("openai".parse::<LlmProvider>().is_err());
    }

    #[test]
    fn test_history_limit_must_be_positive() {
        assert!(check_history_limit(Some(0)).is_err());
        assert_eq!(check_history_limit(Some(4)).unwrap(), Some(4));
        assert_eq!(check_history_limit(None).unwrap(), None);
    }
}
