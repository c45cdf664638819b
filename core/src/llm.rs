use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionTool, ChatCompletionToolArgs,
        ChatCompletionToolChoiceOption, ChatCompletionToolType, CreateChatCompletionRequestArgs,
        FunctionObjectArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::Settings;
use crate::error::{OrchestratorError, Result};
use crate::registry::CapabilityDescriptor;
use crate::runtime::ToolCall;

/// The completion service as seen by the pipeline.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Force the model to pick exactly one of `capabilities` for `intent`.
    /// Fails with `SelectionFailed` when the response carries no tool call.
    async fn select_call(
        &self,
        system: &str,
        intent: &str,
        capabilities: &[CapabilityDescriptor],
    ) -> Result<ToolCall>;

    /// Plain completion, no tools offered.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}

pub struct Brain {
    client: Client<OpenAIConfig>,
    model: String,
}

impl Brain {
    pub fn new(settings: &Settings) -> Self {
        let mut config = OpenAIConfig::new().with_api_key(settings.openai_api_key.clone());
        if let Some(base) = &settings.openai_base_url {
            config = config.with_api_base(base.clone());
        }

        info!("Brain connected. Model: {}", settings.openai_model);
        Self {
            client: Client::with_config(config),
            model: settings.openai_model.clone(),
        }
    }

    fn messages(system: &str, user: &str) -> Result<Vec<ChatCompletionRequestMessage>> {
        Ok(vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system)
                    .build()?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user)
                    .build()?,
            ),
        ])
    }

    fn tools(capabilities: &[CapabilityDescriptor]) -> Result<Vec<ChatCompletionTool>> {
        capabilities
            .iter()
            .map(|c| -> Result<ChatCompletionTool> {
                let function = FunctionObjectArgs::default()
                    .name(&c.name)
                    .description(c.description.clone().unwrap_or_default())
                    .parameters(c.parameters.clone())
                    .build()?;
                Ok(ChatCompletionToolArgs::default()
                    .r#type(ChatCompletionToolType::Function)
                    .function(function)
                    .build()?)
            })
            .collect()
    }
}

#[async_trait]
impl ChatModel for Brain {
    async fn select_call(
        &self,
        system: &str,
        intent: &str,
        capabilities: &[CapabilityDescriptor],
    ) -> Result<ToolCall> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(Self::messages(system, intent)?)
            .tools(Self::tools(capabilities)?)
            .tool_choice(ChatCompletionToolChoiceOption::Required)
            .build()?;

        info!("Sending request to OpenAI");
        let response = self.client.chat().create(request).await?;

        let first_call = response
            .choices
            .first()
            .and_then(|choice| choice.message.tool_calls.as_ref())
            .and_then(|calls| calls.first());

        match first_call {
            Some(call) => Ok(ToolCall::new(
                call.function.name.clone(),
                call.function.arguments.clone(),
            )),
            None => {
                warn!("Model returned no tool call despite required tool choice");
                Err(OrchestratorError::SelectionFailed(
                    "no tool call generated".to_string(),
                ))
            }
        }
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(Self::messages(system, prompt)?)
            .build()?;

        let response = self.client.chat().create(request).await?;
        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| OrchestratorError::Completion("empty completion".to_string()))
    }
}
