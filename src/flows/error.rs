use thiserror::Error;

use crate::gateway::GatewayError;
use crate::prompts::PromptError;

/// Everything a flow can report back to its caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlowError {
    /// Rejected before any model call was made.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The model answered without an error but produced no payload.
    #[error("the model returned no {0}")]
    EmptyResult(&'static str),

    #[error(transparent)]
    Prompt(#[from] PromptError),
}

impl FlowError {
    pub fn validation(message: impl Into<String>) -> Self {
        FlowError::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, FlowError::Validation(_))
    }
}
