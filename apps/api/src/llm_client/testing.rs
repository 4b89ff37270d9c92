//! Scripted `Completion` double for pipeline and handler tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Completion, LlmError};

/// Replies from a queue first, then from the first rule whose needle occurs in
/// the prompt or system text. Unmatched calls fail with a 400 (permanent) error.
#[derive(Default)]
pub struct ScriptedCompletion {
    queue: Mutex<VecDeque<Result<String, LlmError>>>,
    rules: Vec<(String, String)>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, needle: &str, reply: &str) -> Self {
        self.rules.push((needle.to_string(), reply.to_string()));
        self
    }

    pub fn then_ok(self, reply: &str) -> Self {
        self.push(Ok(reply.to_string()))
    }

    pub fn then_err(self, err: LlmError) -> Self {
        self.push(Err(err))
    }

    fn push(self, item: Result<String, LlmError>) -> Self {
        self.queue.lock().unwrap().push_back(item);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Completion for ScriptedCompletion {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(next) = self.queue.lock().unwrap().pop_front() {
            return next;
        }
        self.rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()) || system.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone())
            .ok_or_else(|| LlmError::Api {
                status: 400,
                message: format!("no scripted reply for prompt: {prompt}"),
            })
    }
}
