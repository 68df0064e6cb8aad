use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::Config;
use crate::flows::{FlowContext, Limits};
use crate::gateway::{GatewayFactory, ModelGateway};
use crate::prompts::PromptLibrary;

/// Everything handlers need. Immutable after startup, so requests never contend.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub flows: FlowContext,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let gateway = GatewayFactory::create_gateway(&config.llm_config)?;
        Self::with_gateway(config, gateway)
    }

    pub fn with_gateway(config: Config, gateway: Arc<dyn ModelGateway>) -> anyhow::Result<Self> {
        let prompts = PromptLibrary::with_overrides(&config.system_config.prompt_overrides)?;
        let limits = Limits::from(&config.system_config);

        Ok(Self {
            flows: FlowContext::new(gateway, Arc::new(prompts), limits),
            config: Arc::new(config),
            started_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::mock::RecordingGateway;

    #[test]
    fn test_bad_prompt_override_fails_startup() {
        let mut config = Config::default();
        config
            .system_config
            .prompt_overrides
            .insert("translate".to_string(), "Translate {{text}}".to_string());
        let result = AppState::with_gateway(config, Arc::new(RecordingGateway::empty()));
        assert!(result.is_err());
    }

    #[test]
    fn test_limits_follow_config() {
        let mut config = Config::default();
        config.system_config.max_words = 10;
        let state = AppState::with_gateway(config, Arc::new(RecordingGateway::empty())).unwrap();
        assert_eq!(state.flows.limits.max_words, 10);
    }
}
