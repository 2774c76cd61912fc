pub mod dummy;
pub mod openai;

use super::LLMError;

pub const SYSTEM_INSTRUCTION: &str = "You are an assistant trained to identify and translate text.";

pub trait LLMBuilder {
    type Built: LLM;

    fn build(&self) -> Result<Self::Built, LLMError>;
}

pub trait LLM {
    /// Sends one system instruction and one user message, returns the raw completion.
    async fn complete(&self, system: &str, prompt: &str) -> Result<ChatReply, LLMError>;
}

/// Chat completion payload, reduced to what the translator reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatReply {
    pub choices: Vec<ReplyChoice>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyChoice {
    pub content: Option<String>,
}

impl ChatReply {
    pub fn with_content(content: impl Into<String>) -> Self {
        ChatReply {
            choices: vec![ReplyChoice {
                content: Some(content.into()),
            }],
        }
    }

    /// Content of the first choice, if it has any non-blank text.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()?
            .content
            .as_deref()
            .filter(|c| !c.trim().is_empty())
    }
}

pub fn text_to_prompt(text: &str) -> String {
    format!(
        r#"
Identify the language of the following text and translate it to English if it is not already in English. If the text is in English, return it as is. If the text is unintelligible or malformed, return 'Unintelligible'.

Text: "{}"
"#,
        text
    )
    .trim()
    .to_owned()
}
