//! Terminal front end for the Strudel live-coding agent
//!
//! The binary wires configuration, logging and signal handling around the
//! session from `strudel-core`. This crate holds the pieces that only make
//! sense with a human at a terminal: the console reporter and the shutdown
//! signal.

pub mod console;
pub mod signal;
