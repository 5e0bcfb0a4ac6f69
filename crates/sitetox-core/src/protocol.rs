//! Shared call discipline for both reasoning stages.
//!
//! A [`Consultation`] supplies the prompt and turns the reply into a verdict;
//! [`ReasoningProtocol::consult`] performs exactly one service call, then
//! holds the caller for [`REASONING_COOLDOWN`] whether the call succeeded or
//! not. Calls are never retried.

use std::sync::Arc;
use std::time::{Duration, Instant};

use sitetox_reasoning::{ReasoningError, ReasoningService};
use tracing::{debug, warn};

/// Mandatory pause after every reasoning call; the provider throttles.
pub const REASONING_COOLDOWN: Duration = Duration::from_secs(1);

/// One prompt/interpret pair.
pub trait Consultation {
    type Verdict;

    /// Short stage name for logs, e.g. "evaluate".
    fn stage(&self) -> &'static str;

    fn prompt(&self) -> String;

    fn interpret(&self, reply: &str) -> Self::Verdict;
}

#[derive(Clone)]
pub struct ReasoningProtocol {
    service: Arc<dyn ReasoningService>,
}

impl ReasoningProtocol {
    pub fn new(service: Arc<dyn ReasoningService>) -> Self {
        Self { service }
    }

    pub async fn consult<C: Consultation>(
        &self,
        consultation: &C,
    ) -> Result<C::Verdict, ReasoningError> {
        let prompt = consultation.prompt();
        let started = Instant::now();
        let reply = self.service.generate(&prompt).await;
        let latency_ms = started.elapsed().as_millis() as u64;
        tokio::time::sleep(REASONING_COOLDOWN).await;

        match reply {
            Ok(text) => {
                debug!(
                    stage = consultation.stage(),
                    latency_ms,
                    reply_chars = text.len(),
                    "Reasoning call completed"
                );
                Ok(consultation.interpret(&text))
            }
            Err(e) => {
                warn!(
                    stage = consultation.stage(),
                    latency_ms,
                    code = e.code(),
                    error = %e,
                    "Reasoning call failed"
                );
                Err(e)
            }
        }
    }
}
