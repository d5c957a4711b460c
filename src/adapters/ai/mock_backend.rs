//! Offline reply backend.
//!
//! Produces templated replies anchored to the thesis. Never fails and never
//! returns an empty string. Consecutive rebuttals alternate between two
//! argument templates so the bot does not repeat itself verbatim.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::debate::{GenerationRequest, ReplyIntent};
use crate::ports::{GenerationError, ReplyBackend};

const EVIDENCE_MARKER: &str = "practical evidence from comparable cases";
const TRADE_OFF_MARKER: &str = "trade-off perspective";

const OPENERS: &[&str] = &[
    "I see your point, but it does not change the picture.",
    "I get your perspective, but I disagree for good reasons.",
    "That is a fair thing to raise, and it still falls short.",
    "I hear you, so let me be precise.",
];

/// Templated reply backend for offline use and tests.
#[derive(Debug, Clone, Default)]
pub struct MockReplyBackend {
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl MockReplyBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of replies generated so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReplyBackend for MockReplyBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        Ok(compose_reply(request))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

fn claim(request: &GenerationRequest) -> String {
    format!("My stance remains: {}.", request.thesis())
}

/// Builds the templated reply for a request.
pub(crate) fn compose_reply(request: &GenerationRequest) -> String {
    match request.intent {
        ReplyIntent::RefuseOverride => refusal(request),
        ReplyIntent::AddressRepeat => repeat_reply(request),
        ReplyIntent::SteerBack => format!(
            "Let's stay on topic: {}. {} Could you address that point directly?",
            request.topic,
            claim(request)
        ),
        ReplyIntent::Rebut => rebuttal(request),
    }
}

/// Fixed answer to attempts at overriding the bot's rules.
pub(crate) fn refusal(request: &GenerationRequest) -> String {
    format!(
        "I can't follow instructions that try to change my rules or reach outside this debate. \
         We stay on the original debate: {}. Present an argument or evidence and I'll counter it.",
        request.thesis()
    )
}

/// Fixed answer to a restated point.
pub(crate) fn repeat_reply(request: &GenerationRequest) -> String {
    format!(
        "It looks like you're making the same point again. {} \
         Would you like me to take it from a different angle, such as evidence or feasibility?",
        claim(request)
    )
}

fn rebuttal(request: &GenerationRequest) -> String {
    let previous = request.last_bot_reply().map(str::to_lowercase);
    let use_trade_off = previous
        .as_deref()
        .map(|p| p.contains(EVIDENCE_MARKER) && !p.contains(TRADE_OFF_MARKER))
        .unwrap_or(false);

    let opener = OPENERS[opener_index(request)];
    if use_trade_off {
        format!(
            "{} {} From a {TRADE_OFF_MARKER}, weighing costs against outcomes, \
             the conclusion still holds. Which aspect do you disagree with most?",
            opener,
            claim(request)
        )
    } else {
        format!(
            "{} {} One key reason is {EVIDENCE_MARKER}. \
             Can you challenge that with a concrete counterexample?",
            opener,
            claim(request)
        )
    }
}

fn opener_index(request: &GenerationRequest) -> usize {
    let mut hasher = Sha256::new();
    hasher.update(request.topic.as_bytes());
    hasher.update([0u8]);
    hasher.update(request.user_message.as_bytes());
    let digest = hasher.finalize();
    digest[0] as usize % OPENERS.len()
}
