//! Coaching Generator: sends a synthesized request to the generative
//! collaborator and returns its text.
//!
//! The collaborator sits behind `CoachingModel` so it can be swapped without
//! touching callers. `AppState` holds an `Arc<dyn CoachingModel>`.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::coaching::synthesizer::CoachingRequest;
use crate::llm_client::{LlmClient, LlmError};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Coaching model call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Coaching model did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Coaching model returned empty content")]
    EmptyContent,
}

/// The generative collaborator.
#[async_trait]
pub trait CoachingModel: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, GenerationError>;
}

#[async_trait]
impl CoachingModel for LlmClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, GenerationError> {
        match self.call_text(prompt, system).await {
            Ok(text) => Ok(text),
            Err(LlmError::EmptyContent) => Err(GenerationError::EmptyContent),
            Err(e) => Err(GenerationError::Llm(e)),
        }
    }
}

/// Runs one coaching call, bounded by `timeout`.
///
/// Only structural presence of the answer is checked: blank text is an
/// error, anything else is returned verbatim.
pub async fn generate_coaching(
    model: &dyn CoachingModel,
    request: &CoachingRequest,
    timeout: Duration,
) -> Result<String, GenerationError> {
    let prompt = request.render();

    let text = match tokio::time::timeout(timeout, model.complete(request.system(), &prompt)).await
    {
        Ok(result) => result?,
        Err(_) => {
            warn!("Coaching generation timed out after {timeout:?}");
            return Err(GenerationError::Timeout(timeout));
        }
    };

    if text.trim().is_empty() {
        return Err(GenerationError::EmptyContent);
    }

    info!("Generated coaching text ({} chars)", text.chars().count());
    Ok(text)
}
