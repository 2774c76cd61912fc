use super::{ChatReply, LLMBuilder, ReplyChoice, LLM};
use crate::settings::{ApiType, Settings};
use crate::utils::preview;
use crate::LLMError;
use anyhow::anyhow;
use async_openai::config::{AzureConfig, OpenAIConfig};
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
};
use async_openai::Client;
use std::error::Error;
use std::time::Duration;

/// Builder for OpenAI-compatible chat completion APIs, including Azure deployments
pub struct OpenAiChatBuilder {
    settings: Settings,
}

impl OpenAiChatBuilder {
    pub fn new(settings: Settings) -> Self {
        OpenAiChatBuilder { settings }
    }
}

impl LLMBuilder for OpenAiChatBuilder {
    type Built = OpenAiChat;

    fn build(&self) -> Result<Self::Built, LLMError> {
        let s = &self.settings;
        s.validate()
            .map_err(|e| LLMError::ConfigError(anyhow!("{e}")))?;

        let client = match s.api_type {
            ApiType::OpenAi => {
                let mut config = OpenAIConfig::new().with_api_key(&s.api_key);
                if let Some(api_base) = &s.api_base {
                    config = config.with_api_base(api_base);
                }
                ChatClient::OpenAi(Client::with_config(config))
            }
            ApiType::Azure => {
                let (Some(api_base), Some(api_version)) = (&s.api_base, &s.api_version) else {
                    return Err(LLMError::ConfigError(anyhow!(
                        "Azure requires api_base and api_version"
                    )));
                };
                let config = AzureConfig::new()
                    .with_api_base(api_base)
                    .with_api_version(api_version)
                    .with_deployment_id(&s.deployment_name)
                    .with_api_key(&s.api_key);
                ChatClient::Azure(Client::with_config(config))
            }
        };

        Ok(OpenAiChat {
            client,
            model: s.deployment_name.clone(),
            timeout: s.timeout(),
        })
    }
}

enum ChatClient {
    OpenAi(Client<OpenAIConfig>),
    Azure(Client<AzureConfig>),
}

pub struct OpenAiChat {
    client: ChatClient,
    model: String,
    timeout: Option<Duration>,
}

impl LLM for OpenAiChat {
    async fn complete(&self, system: &str, prompt: &str) -> Result<ChatReply, LLMError> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into(),
        ];
        let req = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()?;

        log::info!(r#"Sending message "{}" to {}"#, preview(prompt), self.model);

        let response = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.send(req))
                .await
                .map_err(|_| {
                    LLMError::ConnectionError(anyhow!(
                        "No response within {} seconds",
                        timeout.as_secs()
                    ))
                })??,
            None => self.send(req).await?,
        };

        Ok(ChatReply {
            choices: response
                .choices
                .into_iter()
                .map(|c| ReplyChoice {
                    content: c.message.content,
                })
                .collect(),
        })
    }
}

impl OpenAiChat {
    async fn send(
        &self,
        req: CreateChatCompletionRequest,
    ) -> Result<CreateChatCompletionResponse, OpenAIError> {
        match &self.client {
            ChatClient::OpenAi(client) => client.chat().create(req).await,
            ChatClient::Azure(client) => client.chat().create(req).await,
        }
    }
}

impl From<OpenAIError> for LLMError {
    fn from(err: OpenAIError) -> Self {
        match err {
            OpenAIError::Reqwest(e) => LLMError::ConnectionError(if let Some(e) = e.source() {
                anyhow!("{e}")
            } else {
                e.into()
            }),
            OpenAIError::ApiError(e) => LLMError::ApiError(anyhow!("{e}")),
            OpenAIError::JSONDeserialize(e) => LLMError::InteractionError(e.into()),
            OpenAIError::FileSaveError(e) => LLMError::OtherError(anyhow!("{e}")),
            OpenAIError::FileReadError(e) => LLMError::OtherError(anyhow!("{e}")),
            OpenAIError::StreamError(e) => LLMError::ConnectionError(anyhow!("{e}")),
            OpenAIError::InvalidArgument(e) => LLMError::OtherError(anyhow!("{e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(api_type: ApiType) -> Settings {
        Settings {
            api_key: "sk-test".to_owned(),
            api_base: None,
            api_type,
            api_version: None,
            deployment_name: "gpt-4o-mini".to_owned(),
            timeout_secs: Some(5),
        }
    }

    #[test]
    fn build_openai_client() {
        let chat = OpenAiChatBuilder::new(settings(ApiType::OpenAi))
            .build()
            .unwrap();
        assert!(matches!(chat.client, ChatClient::OpenAi(_)));
        assert_eq!(chat.model, "gpt-4o-mini");
        assert_eq!(chat.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn build_azure_client() {
        let mut s = settings(ApiType::Azure);
        s.api_base = Some("https://example.openai.azure.com".to_owned());
        s.api_version = Some("2024-02-01".to_owned());
        let chat = OpenAiChatBuilder::new(s).build().unwrap();
        assert!(matches!(chat.client, ChatClient::Azure(_)));
    }

    #[test]
    fn build_incomplete_azure_fails() {
        let res = OpenAiChatBuilder::new(settings(ApiType::Azure)).build();
        assert!(matches!(res, Err(LLMError::ConfigError(_))));
    }

    #[tokio::test]
    async fn unanswered_request_is_a_connection_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let mut s = settings(ApiType::OpenAi);
        s.api_base = Some(format!("http://{}/v1", listener.local_addr().unwrap()));
        s.timeout_secs = Some(1);

        let chat = OpenAiChatBuilder::new(s).build().unwrap();
        let res = chat.complete(crate::llm::SYSTEM_INSTRUCTION, "Hola").await;
        assert!(matches!(res, Err(LLMError::ConnectionError(_))));
        drop(listener);
    }

    #[test]
    fn api_errors_are_classified() {
        let err: LLMError = OpenAIError::InvalidArgument("bad".to_owned()).into();
        assert!(matches!(err, LLMError::OtherError(_)));

        let err: LLMError = OpenAIError::StreamError("closed".to_owned()).into();
        assert!(matches!(err, LLMError::ConnectionError(_)));
    }
}
