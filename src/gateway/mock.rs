//! Recording test double for [`ModelGateway`].

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;

use super::interface::{GatewayError, GatewayRequest, MediaPart, ModelGateway};

pub struct RecordingGateway {
    reply: Result<Option<Value>, GatewayError>,
    calls: Mutex<Vec<RecordedCall>>,
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub schema: &'static str,
    pub media: Option<MediaPart>,
}

impl RecordingGateway {
    pub fn replying(value: Value) -> Self {
        Self::with_reply(Ok(Some(value)))
    }

    pub fn empty() -> Self {
        Self::with_reply(Ok(None))
    }

    pub fn failing(error: GatewayError) -> Self {
        Self::with_reply(Err(error))
    }

    fn with_reply(reply: Result<Option<Value>, GatewayError>) -> Self {
        Self {
            reply,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.calls.lock().unwrap().last().map(|c| c.prompt.clone())
    }
}

#[async_trait]
impl ModelGateway for RecordingGateway {
    async fn invoke(&self, request: GatewayRequest<'_>) -> Result<Option<Value>, GatewayError> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: request.prompt.to_string(),
            schema: request.schema.name,
            media: request.media.cloned(),
        });
        self.reply.clone()
    }

    fn name(&self) -> &str {
        "recording"
    }
}
