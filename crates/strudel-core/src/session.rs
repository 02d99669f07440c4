//! Session state and the turn-taking protocol.
//!
//! A session starts without a program. The first successful turn generates
//! one from scratch; every later turn, from either input channel, is an update
//! that sees the current program. All of this happens under one async mutex
//! held for the whole turn (model call, state change, push), so two turns can
//! never interleave and each model call sees a fully applied prior version.
//! Read-only queries go through a published snapshot instead, so they answer
//! immediately even while a turn is in flight.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use crate::config::AgentConfig;
use crate::core_types::{AcceptedProgram, ProgramSnapshot, Turn, TurnKind, TurnOutcome};
use crate::errors::SessionError;
use crate::generation::GenerationClient;
use crate::llm::{create_llm_client, LLM};
use crate::memory::{ConversationMemory, SlidingWindowMemory};
use crate::playback::PlaybackLink;

pub struct Session {
    current_program: Option<String>,
    memory: Box<dyn ConversationMemory>,
    version: u64,
    program_delivered: bool,
}

impl Session {
    pub fn new(history_limit: usize) -> Self {
        Self {
            current_program: None,
            memory: Box::new(SlidingWindowMemory::new(history_limit)),
            version: 0,
            program_delivered: false,
        }
    }

    pub fn current_program(&self) -> Option<&str> {
        self.current_program.as_deref()
    }

    pub fn has_initial_program(&self) -> bool {
        self.current_program.is_some()
    }

    pub fn memory(&self) -> &dyn ConversationMemory {
        self.memory.as_ref()
    }

    pub(crate) fn memory_mut(&mut self) -> &mut dyn ConversationMemory {
        self.memory.as_mut()
    }

    pub fn next_turn_kind(&self) -> TurnKind {
        if self.has_initial_program() {
            TurnKind::Update
        } else {
            TurnKind::Initial
        }
    }

    /// Replaces the program wholesale and bumps the version.
    pub(crate) fn accept_program(&mut self, code: String, delivered: bool) -> u64 {
        self.current_program = Some(code);
        self.version += 1;
        self.program_delivered = delivered;
        self.version
    }

    pub(crate) fn set_delivered(&mut self, delivered: bool) {
        self.program_delivered = delivered;
    }

    pub fn snapshot(&self) -> Option<ProgramSnapshot> {
        self.current_program.as_ref().map(|code| ProgramSnapshot {
            code: code.clone(),
            version: self.version,
            delivered: self.program_delivered,
        })
    }
}

pub struct SessionController {
    session: Mutex<Session>,
    published: watch::Sender<Option<ProgramSnapshot>>,
    generator: GenerationClient,
    playback: PlaybackLink,
}

impl SessionController {
    pub fn new(llm: Arc<dyn LLM>, playback: PlaybackLink, history_limit: usize) -> Self {
        let (published, _) = watch::channel(None);
        Self {
            session: Mutex::new(Session::new(history_limit)),
            published,
            generator: GenerationClient::new(llm),
            playback,
        }
    }

    /// Validates `config` and wires up the configured model provider.
    pub fn from_config(config: &AgentConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let llm = create_llm_client(&config.llm)?;
        Ok(Self::new(
            llm,
            PlaybackLink::from_config(&config.playback),
            config.session.history_limit,
        ))
    }

    pub fn playback(&self) -> &PlaybackLink {
        &self.playback
    }

    pub async fn check_server(&self) -> bool {
        self.playback.is_healthy().await
    }

    /// Last accepted program. Never waits for a turn in progress.
    pub fn current_program(&self) -> Option<String> {
        self.published.borrow().as_ref().map(|snapshot| snapshot.code.clone())
    }

    pub fn has_initial_program(&self) -> bool {
        self.published.borrow().is_some()
    }

    pub fn snapshot(&self) -> Option<ProgramSnapshot> {
        self.published.borrow().clone()
    }

    pub async fn submit_turn(&self, turn: &Turn) -> TurnOutcome {
        self.submit_turn_observed(turn, |_| {}).await
    }

    /// Runs one turn to completion. `on_start` is told whether the turn is an
    /// initial generation or an update once the session lock is held.
    pub async fn submit_turn_observed<F>(&self, turn: &Turn, on_start: F) -> TurnOutcome
    where
        F: FnOnce(TurnKind) + Send,
    {
        let mut session = self.session.lock().await;
        let kind = session.next_turn_kind();
        on_start(kind);

        log::info!("Processing {} turn as {:?}: {}", turn.source, kind, turn.text);

        let code = self
            .generator
            .generate(&mut session, &turn.text, kind)
            .await?;

        let version = session.accept_program(code.clone(), false);
        self.published.send_replace(session.snapshot());
        let pushed = self.playback.push_code(&code).await;
        session.set_delivered(pushed);
        self.published.send_replace(session.snapshot());

        if pushed {
            log::info!("Program v{} accepted and sent to the playback server", version);
        } else {
            log::warn!(
                "Program v{} accepted but the playback server did not take it",
                version
            );
        }

        Ok(AcceptedProgram {
            kind,
            code,
            version,
            pushed,
        })
    }
}
