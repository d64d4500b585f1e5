use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Handshake between the engine (asks a question, consumes the answer) and an
/// external actor (sees the question, produces the answer).
///
/// `wait` is a genuine blocking wait on a notify permit, not a poll loop.
/// There is no timeout and no cancellation: an unanswered question suspends
/// the engine indefinitely. One outstanding question per engine; a second
/// `submit` before the engine consumes the first overwrites it.
#[derive(Default)]
pub struct AnswerGate {
    slot: Mutex<Option<String>>,
    notify: Notify,
}

impl AnswerGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&self, answer: impl Into<String>) {
        let mut slot = self.slot.lock().expect("answer slot mutex poisoned");
        *slot = Some(answer.into());
        drop(slot);
        self.notify.notify_one();
    }

    pub async fn wait(&self) -> String {
        loop {
            if let Some(answer) = self.take() {
                return answer;
            }
            self.notify.notified().await;
        }
    }

    fn take(&self) -> Option<String> {
        self.slot.lock().expect("answer slot mutex poisoned").take()
    }
}

/// Cloneable handle for submitting an answer while the engine task owns the
/// engine itself.
#[derive(Clone)]
pub struct AnswerHandle {
    gate: Arc<AnswerGate>,
}

impl AnswerHandle {
    pub(crate) fn new(gate: Arc<AnswerGate>) -> Self {
        Self { gate }
    }

    pub fn submit(&self, answer: impl Into<String>) {
        self.gate.submit(answer);
    }
}
