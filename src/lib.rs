pub mod llm;
pub mod parser;
pub mod settings;
pub mod utils;

use crate::llm::openai::OpenAiChatBuilder;
use crate::llm::{LLMBuilder, LLM};
use crate::parser::ReplyClass;
use crate::settings::Settings;
use std::fmt::Display;
use std::path::PathBuf;

pub const UNEXPECTED_RESPONSE_FORMAT: &str = "Error: Unexpected response format";
pub const UNABLE_TO_PROCESS_REQUEST: &str = "Error: Unable to process request";

/// Detects the language of `text` and translates it to English with the configured LLM.
pub async fn translate(text: &str, settings: &Settings) -> TranslationResult {
    let llm = match OpenAiChatBuilder::new(settings.clone()).build() {
        Ok(llm) => llm,
        Err(e) => {
            log::error!("Could not set up the LLM client: {e}");
            return TranslationResult::error(UNABLE_TO_PROCESS_REQUEST);
        }
    };

    LlmTranslationService { llm }.translate(text).await
}

/// Outcome of one translation request. Failures are reported through `text`, never raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    pub is_english: bool,
    pub text: String,
}

impl TranslationResult {
    fn error(msg: &str) -> Self {
        TranslationResult {
            is_english: false,
            text: msg.to_owned(),
        }
    }
}

impl From<TranslationResult> for (bool, String) {
    fn from(res: TranslationResult) -> Self {
        (res.is_english, res.text)
    }
}

pub trait TranslationService {
    async fn translate(&self, text: &str) -> TranslationResult;
}

#[derive(Debug)]
pub enum ConfigError {
    MissingFile(PathBuf),
    Invalid(String),
    Source(config::ConfigError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingFile(path) => {
                write!(f, "Config file not found: {:?}", path)
            }
            ConfigError::Invalid(msg) => {
                write!(f, "Invalid config: {}", msg)
            }
            ConfigError::Source(e) => {
                write!(f, "Could not load config: {}", e)
            }
        }
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Source(err)
    }
}

#[derive(Debug)]
pub enum LLMError {
    ConfigError(anyhow::Error),
    ConnectionError(anyhow::Error),
    ApiError(anyhow::Error),
    InteractionError(anyhow::Error),
    OtherError(anyhow::Error),
}

impl Display for LLMError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMError::ConfigError(e) => {
                write!(f, "LLM misconfigured: {}", e)
            }
            LLMError::ConnectionError(e) => {
                write!(f, "Connection error: {}", e)
            }
            LLMError::ApiError(e) => {
                write!(f, "API error: {}", e)
            }
            LLMError::InteractionError(e) => {
                write!(f, "Unexpected LLM behavior: {}", e)
            }
            LLMError::OtherError(e) => {
                write!(f, "Error: {}", e)
            }
        }
    }
}

pub struct LlmTranslationService<L> {
    llm: L,
}

impl<L: LLM> LlmTranslationService<L> {
    pub fn new(llm: L) -> Self {
        LlmTranslationService { llm }
    }

    pub fn from_builder<LB>(builder: &LB) -> Result<Self, LLMError>
    where
        LB: LLMBuilder<Built = L>,
    {
        Ok(Self::new(builder.build()?))
    }
}

impl<L: LLM> TranslationService for LlmTranslationService<L> {
    async fn translate(&self, text: &str) -> TranslationResult {
        let prompt = llm::text_to_prompt(text);

        let reply = match self.llm.complete(llm::SYSTEM_INSTRUCTION, &prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                log::error!("Error during LLM query: {e}");
                return TranslationResult::error(UNABLE_TO_PROCESS_REQUEST);
            }
        };

        let Some(content) = reply.first_content() else {
            log::warn!("Received empty or malformed response from the LLM");
            return TranslationResult::error(UNEXPECTED_RESPONSE_FORMAT);
        };
        log::debug!("LLM replied: {content}");

        match parser::classify_reply(text, content) {
            ReplyClass::Malformed => {
                log::warn!("Unexpected format from LLM: {}", utils::preview(content));
                TranslationResult::error(UNEXPECTED_RESPONSE_FORMAT)
            }
            ReplyClass::Unintelligible => TranslationResult::error(parser::UNINTELLIGIBLE),
            ReplyClass::English => TranslationResult {
                is_english: true,
                text: text.to_owned(),
            },
            ReplyClass::Translated(translation) => TranslationResult {
                is_english: false,
                text: translation,
            },
        }
    }
}
