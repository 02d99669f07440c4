//! Feeds the session from two places at once.
//!
//! The foreground reads lines from the operator; a spawned task polls the
//! playback server's prompt queue on a fixed interval. Both hand their turns
//! to the same `SessionController`, which runs them one at a time. The poller
//! never touches session state itself and never lets a failure escape: a bad
//! poll or a failed remote turn is reported and the next tick carries on.

use std::io::ErrorKind;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::core_types::Turn;
use crate::errors::SessionError;
use crate::report::SessionReporter;
use crate::session::SessionController;

/// What a line typed at the prompt means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    Empty,
    ShowProgram,
    Quit,
    Turn(String),
}

impl InputCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return InputCommand::Empty;
        }
        match trimmed.to_lowercase().as_str() {
            "code" => InputCommand::ShowProgram,
            "quit" | "exit" | "q" => InputCommand::Quit,
            _ => InputCommand::Turn(trimmed.to_string()),
        }
    }
}

pub struct InputMultiplexer {
    controller: Arc<SessionController>,
    reporter: Arc<dyn SessionReporter>,
    poll_interval: Duration,
    shutdown: CancellationToken,
}

impl InputMultiplexer {
    pub fn new(
        controller: Arc<SessionController>,
        reporter: Arc<dyn SessionReporter>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            controller,
            reporter,
            poll_interval,
            shutdown: CancellationToken::new(),
        }
    }

    /// Cancelling this token stops both loops.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Runs the interactive loop with the remote poller alongside it until
    /// the operator quits, input ends, or the shutdown token fires.
    pub async fn run<R>(&self, reader: R) -> Result<(), SessionError>
    where
        R: AsyncBufRead + Unpin,
    {
        let poller = self.spawn_remote_poller();
        let result = self.run_interactive(reader).await;
        self.shutdown.cancel();
        if let Err(e) = poller.await {
            log::error!("Remote prompt poller ended abnormally: {}", e);
        }
        result
    }

    pub fn spawn_remote_poller(&self) -> JoinHandle<()> {
        let controller = self.controller.clone();
        let reporter = self.reporter.clone();
        let shutdown = self.shutdown.clone();
        let poll_interval = self.poll_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let prompt = tokio::select! {
                    _ = shutdown.cancelled() => break,
                    prompt = controller.playback().poll_remote_prompt() => prompt,
                };

                let Some(text) = prompt else { continue };
                log::info!("Received prompt from web interface: {}", text);

                let turn = Turn::remote(text);
                let outcome = controller
                    .submit_turn_observed(&turn, |kind| reporter.turn_started(&turn, kind))
                    .await;
                if let Err(e) = &outcome {
                    log::warn!("Remote turn failed, polling continues: {}", e);
                }
                reporter.turn_finished(&turn, &outcome);
                reporter.ready_for_input();
            }

            log::debug!("Remote prompt poller stopped");
        })
    }

    /// Reads operator input until quit, end of input, or shutdown. Lines that
    /// are not valid UTF-8 are skipped with a notice.
    pub async fn run_interactive<R>(&self, reader: R) -> Result<(), SessionError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();

        let result = loop {
            self.reporter.ready_for_input();

            let line = tokio::select! {
                _ = self.shutdown.cancelled() => break Ok(()),
                line = lines.next_line() => line,
            };

            let line = match line {
                Ok(Some(line)) => line,
                Ok(None) => break Ok(()),
                // The offending line is already consumed; the next one reads cleanly.
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    log::warn!("Skipping unreadable input line: {}", e);
                    self.reporter
                        .notice(&format!("Could not read that line ({}), please try again", e));
                    continue;
                }
                Err(e) => break Err(SessionError::from(e)),
            };

            match InputCommand::parse(&line) {
                InputCommand::Empty => continue,
                InputCommand::Quit => break Ok(()),
                InputCommand::ShowProgram => {
                    let snapshot = self.controller.snapshot();
                    self.reporter.show_program(snapshot.as_ref());
                }
                InputCommand::Turn(text) => {
                    let turn = Turn::interactive(text);
                    let outcome = self
                        .controller
                        .submit_turn_observed(&turn, |kind| self.reporter.turn_started(&turn, kind))
                        .await;
                    self.reporter.turn_finished(&turn, &outcome);
                }
            }
        };

        self.shutdown.cancel();
        result
    }
}
