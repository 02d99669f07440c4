pub mod mock_gemini_server;
pub mod mock_playback_server;

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::core_types::{LLMResponse, Message, ProgramSnapshot, Turn, TurnKind, TurnOutcome, TurnSource};
use crate::errors::SessionError;
use crate::llm::LLM;
use crate::report::SessionReporter;

/// Model stand-in that replays a fixed list of results and records every
/// message list it was sent.
pub struct ScriptedLLM {
    responses: Mutex<VecDeque<Result<String, SessionError>>>,
    calls: Mutex<Vec<Vec<Message>>>,
    delay_ms: AtomicU64,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedLLM {
    pub fn new(responses: Vec<Result<String, SessionError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
            delay_ms: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }

    /// Every call sleeps this long before answering.
    pub fn with_delay(self: Arc<Self>, delay: Duration) -> Arc<Self> {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
        self
    }

    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }

    /// Highest number of calls that were running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LLM for ScriptedLLM {
    async fn generate(&self, messages: Vec<Message>) -> Result<LLMResponse, SessionError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.calls.lock().unwrap().push(messages);

        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        let next = self.responses.lock().unwrap().pop_front();
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match next {
            Some(Ok(text)) => Ok(LLMResponse::text(text)),
            Some(Err(e)) => Err(e),
            None => Err(SessionError::Generation("scripted responses exhausted".to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedEvent {
    Started(TurnSource, TurnKind),
    Finished(TurnSource, bool),
    Show(Option<String>),
    Notice(String),
}

/// Reporter that keeps everything it is told.
#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<RecordedEvent>>,
    finished: Mutex<Vec<(TurnSource, TurnOutcome)>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn finished(&self) -> Vec<(TurnSource, TurnOutcome)> {
        self.finished.lock().unwrap().clone()
    }

    /// Waits until at least `count` turns have finished. Panics on timeout.
    pub async fn wait_for_finished(&self, count: usize, timeout: Duration) {
        let waited = tokio::time::timeout(timeout, async {
            while self.finished.lock().unwrap().len() < count {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(waited.is_ok(), "timed out waiting for {} finished turns", count);
    }

    /// Waits until `event` has been recorded. Panics on timeout.
    pub async fn wait_for_event(&self, event: &RecordedEvent, timeout: Duration) {
        let waited = tokio::time::timeout(timeout, async {
            while !self.events.lock().unwrap().contains(event) {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(waited.is_ok(), "timed out waiting for {:?}", event);
    }
}

impl SessionReporter for RecordingReporter {
    fn turn_started(&self, turn: &Turn, kind: TurnKind) {
        self.events
            .lock()
            .unwrap()
            .push(RecordedEvent::Started(turn.source, kind));
    }

    fn turn_finished(&self, turn: &Turn, outcome: &TurnOutcome) {
        self.events
            .lock()
            .unwrap()
            .push(RecordedEvent::Finished(turn.source, outcome.is_ok()));
        self.finished.lock().unwrap().push((turn.source, outcome.clone()));
    }

    fn show_program(&self, snapshot: Option<&ProgramSnapshot>) {
        self.events
            .lock()
            .unwrap()
            .push(RecordedEvent::Show(snapshot.map(|s| s.code.clone())));
    }

    fn notice(&self, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(RecordedEvent::Notice(message.to_string()));
    }
}
