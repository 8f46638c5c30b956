//! Routes a decoded [`Operation`] to its computation.

use crate::dtos::{Operation, OperationOutput};
use crate::services::{math, metrics, providers::TextProvider};
use service_core::error::AppError;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct Dispatcher {
    text_provider: Arc<dyn TextProvider>,
}

impl Dispatcher {
    pub fn new(text_provider: Arc<dyn TextProvider>) -> Self {
        Self { text_provider }
    }

    pub fn provider_name(&self) -> &'static str {
        self.text_provider.name()
    }

    pub async fn execute(&self, operation: Operation) -> Result<OperationOutput, AppError> {
        let key = operation.key();
        let result = match operation {
            Operation::Fibonacci(n) => math::fibonacci(n).map(OperationOutput::Sequence),
            Operation::Prime(values) => math::primes(&values).map(OperationOutput::Numbers),
            Operation::Lcm(values) => math::lcm(&values).map(OperationOutput::Number),
            Operation::Hcf(values) => math::hcf(&values).map(OperationOutput::Number),
            Operation::Ai(question) => self.ask(&question).await.map(OperationOutput::Word),
        };

        metrics::record_operation(key, result.is_ok());
        result
    }

    async fn ask(&self, question: &str) -> Result<String, AppError> {
        let start = Instant::now();
        let result = self.text_provider.answer(question).await;
        metrics::record_provider_call(self.text_provider.name(), start.elapsed(), result.is_ok());

        match result {
            Ok(word) => {
                tracing::debug!(provider = self.text_provider.name(), "AI answer extracted");
                Ok(word)
            }
            Err(e) => {
                tracing::warn!(
                    provider = self.text_provider.name(),
                    error = %e,
                    "AI provider call failed"
                );
                Err(e.into())
            }
        }
    }
}
