use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::domain::{AssessmentResult, ChatReply, Message, UserId};
use super::extraction::{contains_assessment, text_sample, AssessmentExtractor};
use super::prompt::{build_assessment_prompt, build_chat_prompt, ASSESSMENT_REQUEST};
use super::registry::{AssistantClient, ClientError, CompletionRequest, RegistryError, ScaleRegistry};
use crate::config::AssistantConfig;

const TOP_P: f32 = 0.95;

/// Service pairing the assistant client with assessment extraction.
pub struct AssessmentService<C, S> {
    client: Arc<C>,
    scales: Arc<S>,
    extractor: AssessmentExtractor,
    config: AssistantConfig,
}

impl<C, S> AssessmentService<C, S>
where
    C: AssistantClient + 'static,
    S: ScaleRegistry + 'static,
{
    pub fn new(client: Arc<C>, scales: Arc<S>, config: AssistantConfig) -> Self {
        Self::with_extractor(client, scales, config, AssessmentExtractor::default())
    }

    pub fn with_extractor(
        client: Arc<C>,
        scales: Arc<S>,
        config: AssistantConfig,
        extractor: AssessmentExtractor,
    ) -> Self {
        Self {
            client,
            scales,
            extractor,
            config,
        }
    }

    /// Relay one user message; attach an assessment when the reply carries one.
    pub fn process_chat_message(
        &self,
        user: &UserId,
        message: &str,
    ) -> Result<ChatReply, AssessmentServiceError> {
        let scales = self.scales.active_scales(user)?;
        let request = CompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                Message::system(build_chat_prompt(&scales)),
                Message::user(message),
            ],
            temperature: self.config.chat_temperature,
            max_tokens: self.config.chat_max_tokens,
            top_p: TOP_P,
        };

        let reply = self.client.complete(&request)?;
        debug!(reply = %text_sample(&reply, 500), "raw assistant reply");

        let is_assessment = contains_assessment(&reply);
        let assessment = if is_assessment {
            info!(%user, "assessment detected in assistant reply");
            let extracted = self.extractor.extract(&reply, &scales);
            if extracted.is_none() {
                warn!(%user, "failed to extract assessment despite detecting it");
            }
            extracted
        } else {
            None
        };

        Ok(ChatReply {
            message: reply,
            is_assessment,
            assessment,
        })
    }

    /// Ask for a complete assessment of `conversation` and recover it.
    pub fn generate_mood_assessment(
        &self,
        user: &UserId,
        conversation: &[Message],
    ) -> Result<AssessmentResult, AssessmentServiceError> {
        let scales = self.scales.active_scales(user)?;

        let mut messages = Vec::with_capacity(conversation.len() + 2);
        messages.push(Message::system(build_assessment_prompt(&scales)));
        messages.extend_from_slice(conversation);
        messages.push(Message::user(ASSESSMENT_REQUEST));

        let request = CompletionRequest {
            model: self.config.model.clone(),
            messages,
            temperature: self.config.assessment_temperature,
            max_tokens: self.config.assessment_max_tokens,
            top_p: TOP_P,
        };

        let reply = self.client.complete(&request)?;
        debug!(reply = %text_sample(&reply, 500), "assistant assessment reply");

        self.extractor
            .extract(&reply, &scales)
            .filter(|assessment| !assessment.scale_values.is_empty())
            .ok_or_else(|| {
                error!(%user, reply = %text_sample(&reply, 500), "failed to generate valid assessment");
                AssessmentServiceError::NoAssessment
            })
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error("failed to generate a valid mood assessment")]
    NoAssessment,
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
