use super::{ChatReply, LLMBuilder, LLM};
use crate::LLMError;
use anyhow::anyhow;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub enum DummyResponse {
    Reply(ChatReply),
    Failure(String),
}

/// Scripted LLM, answers every request the same way and remembers what it was sent.
#[derive(Debug)]
pub struct DummyLLM {
    response: DummyResponse,
    requests: Mutex<Vec<(String, String)>>,
}

impl DummyLLM {
    pub fn new(response: DummyResponse) -> Self {
        DummyLLM {
            response,
            requests: Mutex::new(vec![]),
        }
    }

    pub fn replying(content: &str) -> Self {
        Self::new(DummyResponse::Reply(ChatReply::with_content(content)))
    }

    pub fn failing(msg: &str) -> Self {
        Self::new(DummyResponse::Failure(msg.to_owned()))
    }

    /// `(system, prompt)` pairs received so far.
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

pub struct DummyLLMBuilder(pub DummyResponse);

impl LLMBuilder for DummyLLMBuilder {
    type Built = DummyLLM;

    fn build(&self) -> Result<Self::Built, LLMError> {
        Ok(DummyLLM::new(self.0.clone()))
    }
}

impl LLM for DummyLLM {
    async fn complete(&self, system: &str, prompt: &str) -> Result<ChatReply, LLMError> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((system.to_owned(), prompt.to_owned()));

        match &self.response {
            DummyResponse::Reply(reply) => Ok(reply.clone()),
            DummyResponse::Failure(msg) => Err(LLMError::ConnectionError(anyhow!("{msg}"))),
        }
    }
}
