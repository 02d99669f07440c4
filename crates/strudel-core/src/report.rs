//! Where turn outcomes go.
//!
//! The multiplexer never prints. It hands every event to a `SessionReporter`
//! so the console front end and the tests can each decide how much to show.

use crate::core_types::{ProgramSnapshot, Turn, TurnKind, TurnOutcome};

pub trait SessionReporter: Send + Sync {
    /// A turn took the session lock and is about to call the model.
    fn turn_started(&self, turn: &Turn, kind: TurnKind);

    fn turn_finished(&self, turn: &Turn, outcome: &TurnOutcome);

    /// Answer to the "show current program" command.
    fn show_program(&self, snapshot: Option<&ProgramSnapshot>);

    /// Transient, non-turn information (e.g. the player went away).
    fn notice(&self, message: &str);

    /// The interactive channel is ready for the next line.
    fn ready_for_input(&self) {}
}
