/// Mock generators for testing without calling the Gemini API.
use std::sync::Mutex;

use super::{AnswerGenerator, GenerationParams};
use crate::gemini::ProviderError;

/// Returns a canned answer and records every call for inspection.
pub struct MockGenerator {
    answer: String,
    calls: Mutex<Vec<(String, GenerationParams)>>,
}

impl MockGenerator {
    #[must_use]
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Prompt and params of the most recent call, if any.
    pub fn last_call(&self) -> Option<(String, GenerationParams)> {
        self.calls.lock().unwrap().last().cloned()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl AnswerGenerator for MockGenerator {
    fn generate(&self, prompt: &str, params: GenerationParams) -> Result<String, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), params));
        Ok(self.answer.clone())
    }
}

/// Always fails, simulating a remote provider outage.
pub struct FailingGenerator;

impl AnswerGenerator for FailingGenerator {
    fn generate(&self, _prompt: &str, _params: GenerationParams) -> Result<String, ProviderError> {
        Err(ProviderError::Api {
            status: 503,
            message: "service unavailable".to_string(),
        })
    }
}
