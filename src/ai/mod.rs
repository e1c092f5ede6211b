//! Generative backend integration.
//!
//! Stages talk to a [`Generator`]: one call with a system and a user prompt,
//! answered with a JSON record. Concrete providers (OpenAI, Claude, Ollama)
//! live behind the `ai` feature; [`GenerationManager`] chains them with
//! fallback.
//!
//! Logo artwork goes through a separate [`LogoRenderer`] seam.

#[cfg(feature = "ai")]
mod claude;
#[cfg(feature = "ai")]
mod ollama;
#[cfg(feature = "ai")]
mod openai;

#[cfg(feature = "ai")]
pub use claude::ClaudeProvider;
#[cfg(feature = "ai")]
pub use ollama::OllamaProvider;
#[cfg(feature = "ai")]
pub use openai::OpenAIProvider;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::GenerationConfig;

/// A backend that turns prompts into a structured JSON reply.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Run one generation call.
    async fn generate(&self, system: &str, user: &str) -> anyhow::Result<Value>;

    /// Provider name for logs.
    fn name(&self) -> &str;
}

/// Renders a logo image and returns where it can be fetched.
#[async_trait]
pub trait LogoRenderer: Send + Sync {
    /// Render one candidate's artwork. `slot` is the 0-based candidate id.
    async fn render(&self, prompt: &str, output_id: &str, slot: usize) -> anyhow::Result<String>;
}

/// Renderer used when no image backend is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledRenderer;

#[async_trait]
impl LogoRenderer for DisabledRenderer {
    async fn render(&self, _prompt: &str, _output_id: &str, _slot: usize) -> anyhow::Result<String> {
        Err(AIError::ProviderNotAvailable("logo rendering is disabled".to_string()).into())
    }
}

/// AI error types.
#[derive(Debug, thiserror::Error)]
pub enum AIError {
    #[error("Provider not available: {0}")]
    ProviderNotAvailable(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Malformed reply: {0}")]
    MalformedReply(String),

    #[error("No response from AI")]
    NoResponse,
}

/// Parse a model reply into JSON.
///
/// Tolerates a surrounding markdown code fence. Anything else that is not
/// valid JSON is a [`AIError::MalformedReply`].
pub fn parse_json_reply(text: &str) -> Result<Value, AIError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AIError::NoResponse);
    }

    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map_or(trimmed, str::trim);

    serde_json::from_str(body).map_err(|e| AIError::MalformedReply(e.to_string()))
}

/// Generator with an ordered provider chain.
///
/// Tries each provider in turn and returns the first success.
pub struct GenerationManager {
    providers: Vec<Box<dyn Generator>>,
}

impl GenerationManager {
    /// Create a manager over an explicit provider list.
    pub fn new(providers: Vec<Box<dyn Generator>>) -> Self {
        Self { providers }
    }

    /// A manager with no providers. Every call fails.
    pub fn disabled() -> Self {
        Self { providers: Vec::new() }
    }

    /// Build the provider chain from configuration.
    ///
    /// The primary provider comes first, then each fallback. Providers that
    /// cannot be constructed (missing API key, unknown name) are skipped
    /// with a warning.
    pub fn from_config(config: &GenerationConfig) -> Self {
        let mut providers: Vec<Box<dyn Generator>> = Vec::new();
        let mut names = vec![config.provider.as_str()];
        names.extend(config.fallback.iter().map(String::as_str));

        for (index, name) in names.into_iter().enumerate() {
            if providers.iter().any(|p| p.name() == name) {
                continue;
            }
            let model = if index == 0 { config.model.as_deref() } else { None };
            match build_provider(name, model, config) {
                Ok(Some(provider)) => providers.push(provider),
                Ok(None) => {}
                Err(e) => tracing::warn!(provider = name, error = %e, "Skipping provider"),
            }
        }

        Self { providers }
    }

    /// Check if any provider is configured.
    pub fn is_available(&self) -> bool {
        !self.providers.is_empty()
    }

    /// Names of the configured providers, in order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }
}

#[async_trait]
impl Generator for GenerationManager {
    async fn generate(&self, system: &str, user: &str) -> anyhow::Result<Value> {
        for provider in &self.providers {
            match provider.generate(system, user).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "Provider failed, trying next");
                }
            }
        }

        Err(AIError::ProviderNotAvailable("No AI provider available".to_string()).into())
    }

    fn name(&self) -> &str {
        self.providers.first().map_or("none", |p| p.name())
    }
}

#[cfg(feature = "ai")]
fn build_provider(
    name: &str,
    model: Option<&str>,
    config: &GenerationConfig,
) -> anyhow::Result<Option<Box<dyn Generator>>> {
    let timeout = std::time::Duration::from_secs(config.timeout_secs);
    let provider: Box<dyn Generator> = match name {
        "none" => return Ok(None),
        "openai" => {
            let mut provider = OpenAIProvider::new(timeout)?;
            if let Some(model) = model {
                provider = provider.with_model(model);
            }
            Box::new(provider)
        }
        "claude" => {
            let mut provider = ClaudeProvider::new(timeout)?;
            if let Some(model) = model {
                provider = provider.with_model(model);
            }
            Box::new(provider)
        }
        "ollama" => Box::new(
            OllamaProvider::new(timeout)?
                .with_base_url(config.ollama.base_url.clone())
                .with_model(model.unwrap_or(config.ollama.model.as_str())),
        ),
        other => anyhow::bail!("unknown provider '{}'", other),
    };
    Ok(Some(provider))
}

#[cfg(not(feature = "ai"))]
fn build_provider(
    name: &str,
    _model: Option<&str>,
    _config: &GenerationConfig,
) -> anyhow::Result<Option<Box<dyn Generator>>> {
    match name {
        "none" => Ok(None),
        other => anyhow::bail!("provider '{}' needs the `ai` feature", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Fixed(&'static str, Option<Value>);

    #[async_trait]
    impl Generator for Fixed {
        async fn generate(&self, _system: &str, _user: &str) -> anyhow::Result<Value> {
            self.1.clone().ok_or_else(|| anyhow::anyhow!("{} is down", self.0))
        }

        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_parse_plain_json() {
        assert_eq!(parse_json_reply(r#"{"options": []}"#).unwrap(), json!({"options": []}));
    }

    #[test]
    fn test_parse_fenced_json() {
        let reply = "```json\n{\"options\": [1]}\n```";
        assert_eq!(parse_json_reply(reply).unwrap(), json!({"options": [1]}));
        let reply = "```\n{\"a\": true}\n```";
        assert_eq!(parse_json_reply(reply).unwrap(), json!({"a": true}));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_json_reply("   "), Err(AIError::NoResponse)));
        assert!(matches!(parse_json_reply("Sure! Here you go"), Err(AIError::MalformedReply(_))));
    }

    #[tokio::test]
    async fn test_manager_falls_back() {
        let manager = GenerationManager::new(vec![
            Box::new(Fixed("first", None)),
            Box::new(Fixed("second", Some(json!({"ok": 1})))),
        ]);
        assert_eq!(manager.name(), "first");
        assert_eq!(manager.generate("s", "u").await.unwrap(), json!({"ok": 1}));
    }

    #[tokio::test]
    async fn test_disabled_manager_fails() {
        let manager = GenerationManager::disabled();
        assert!(!manager.is_available());
        assert_eq!(manager.name(), "none");
        assert!(manager.generate("s", "u").await.is_err());
    }

    #[test]
    fn test_from_config_none() {
        let config = GenerationConfig { provider: "none".into(), fallback: Vec::new(), ..GenerationConfig::default() };
        assert!(!GenerationManager::from_config(&config).is_available());
    }

    #[test]
    fn test_from_config_skips_unknown() {
        let config = GenerationConfig {
            provider: "nonexistent".into(),
            fallback: vec!["none".into()],
            ..GenerationConfig::default()
        };
        assert!(GenerationManager::from_config(&config).provider_names().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_renderer() {
        assert!(DisabledRenderer.render("p", "output_01", 0).await.is_err());
    }
}
