//! Scripted reasoning service (testing only)
//!
//! `ScriptedReasoner` answers from rules keyed on prompt substrings, falling
//! back to a FIFO queue of replies. Every prompt it receives is recorded so
//! tests can assert on call counts and prompt contents.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ReasoningError;
use crate::{ReasoningService, Result};

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Fail(String),
}

impl Reply {
    fn into_result(self) -> Result<String> {
        match self {
            Reply::Text(text) => Ok(text),
            Reply::Fail(message) => Err(ReasoningError::Injected(message)),
        }
    }
}

/// Deterministic [`ReasoningService`] for tests.
#[derive(Debug, Default)]
pub struct ScriptedReasoner {
    rules: Mutex<Vec<(String, Reply)>>,
    queue: Mutex<VecDeque<Reply>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedReasoner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `text` whenever the prompt contains `needle`.
    pub fn on(self, needle: impl Into<String>, text: impl Into<String>) -> Self {
        self.rules
            .lock()
            .unwrap()
            .push((needle.into(), Reply::Text(text.into())));
        self
    }

    /// Fail whenever the prompt contains `needle`.
    pub fn fail_on(self, needle: impl Into<String>, message: impl Into<String>) -> Self {
        self.rules
            .lock()
            .unwrap()
            .push((needle.into(), Reply::Fail(message.into())));
        self
    }

    /// Queue a reply for the next prompt no rule matches.
    pub fn then(self, text: impl Into<String>) -> Self {
        self.queue
            .lock()
            .unwrap()
            .push_back(Reply::Text(text.into()));
        self
    }

    /// Queue a failure for the next prompt no rule matches.
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.queue
            .lock()
            .unwrap()
            .push_back(Reply::Fail(message.into()));
        self
    }

    /// Every prompt received, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl ReasoningService for ScriptedReasoner {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        let matched = self
            .rules
            .lock()
            .unwrap()
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone());
        if let Some(reply) = matched {
            return reply.into_result();
        }

        match self.queue.lock().unwrap().pop_front() {
            Some(reply) => reply.into_result(),
            None => Err(ReasoningError::Injected(
                "no scripted reply left".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rules_take_precedence_over_queue() {
        let reasoner = ScriptedReasoner::new()
            .on("Team A", "rule reply")
            .then("queued reply");

        assert_eq!(reasoner.generate("about Team A").await.unwrap(), "rule reply");
        assert_eq!(reasoner.generate("about Team B").await.unwrap(), "queued reply");
        assert!(reasoner.generate("about Team C").await.is_err());
        assert_eq!(reasoner.calls(), 3);
    }
}
