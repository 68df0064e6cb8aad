use serde::de::DeserializeOwned;
use std::sync::Arc;

use super::error::FlowError;
use crate::config::SystemConfig;
use crate::gateway::{generate, GatewayRequest, MediaPart, ModelGateway, OutputSchema};
use crate::prompts::{Capability, PromptLibrary, TemplateVars};

/// Request limits enforced during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_words: usize,
    pub default_vocabulary_size: u32,
    pub max_vocabulary_size: u32,
    pub max_image_bytes: usize,
}

impl From<&SystemConfig> for Limits {
    fn from(config: &SystemConfig) -> Self {
        Self {
            max_words: config.max_words,
            default_vocabulary_size: config.default_vocabulary_size,
            max_vocabulary_size: config.max_vocabulary_size,
            max_image_bytes: config.max_image_bytes,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::from(&SystemConfig::default())
    }
}

/// Shared, read-only collaborators for every flow. Cheap to clone.
#[derive(Clone)]
pub struct FlowContext {
    pub gateway: Arc<dyn ModelGateway>,
    pub prompts: Arc<PromptLibrary>,
    pub limits: Limits,
}

impl FlowContext {
    pub fn new(gateway: Arc<dyn ModelGateway>, prompts: Arc<PromptLibrary>, limits: Limits) -> Self {
        Self {
            gateway,
            prompts,
            limits,
        }
    }

    /// Render the capability's template and run it through the gateway.
    pub(crate) async fn run<T: DeserializeOwned>(
        &self,
        capability: Capability,
        vars: &TemplateVars,
        schema: &OutputSchema,
        media: Option<&MediaPart>,
    ) -> Result<Option<T>, FlowError> {
        let prompt = self.prompts.get(capability).render(vars)?;
        let request = GatewayRequest {
            prompt: &prompt,
            schema,
            media,
        };
        Ok(generate(self.gateway.as_ref(), request).await?)
    }
}
