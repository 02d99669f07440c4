use std::io::{self, Write};

use strudel_core::core_types::{ProgramSnapshot, Turn, TurnKind, TurnOutcome, TurnSource};
use strudel_core::report::SessionReporter;

const RULE_WIDTH: usize = 50;

/// Prints session events for a human at the terminal.
pub struct ConsoleReporter {
    show_prompt: bool,
}

impl ConsoleReporter {
    pub fn interactive() -> Self {
        Self { show_prompt: true }
    }

    pub fn one_shot() -> Self {
        Self { show_prompt: false }
    }

    pub fn banner(&self, title: &str) {
        println!("🎵 {}", title);
        println!("{}", "=".repeat(RULE_WIDTH));
    }

    pub fn server_status(&self, healthy: bool, server_url: &str) {
        if healthy {
            println!("✅ Strudel server connected at {}", server_url);
        } else {
            self.notice(&format!(
                "⚠️  Strudel server not detected at {}\nContinuing in code generation mode...",
                server_url
            ));
        }
    }

    pub fn usage(&self) {
        println!("\nCommands:");
        println!("  - Type your music description to start or update");
        println!("  - 'code' - Show current code");
        println!("  - 'quit' or 'exit' - Exit the session");
        println!("\n{}", "=".repeat(RULE_WIDTH));
    }

    pub fn farewell(&self) {
        println!("\n👋 Thanks for live coding!");
    }

    fn code_block(&self, code: &str) {
        println!("{}", "-".repeat(RULE_WIDTH));
        println!("{}", code);
        println!("{}", "-".repeat(RULE_WIDTH));
    }
}

impl SessionReporter for ConsoleReporter {
    fn turn_started(&self, turn: &Turn, kind: TurnKind) {
        if turn.source == TurnSource::Remote {
            println!("\n\n🌐 Web prompt: {}", turn.text);
        }
        match kind {
            TurnKind::Initial => println!("\nGenerating initial code..."),
            TurnKind::Update => println!("\n🔄 Update request: {}\n\nGenerating updated code...", turn.text),
        }
    }

    fn turn_finished(&self, _turn: &Turn, outcome: &TurnOutcome) {
        match outcome {
            Ok(accepted) => {
                let heading = match accepted.kind {
                    TurnKind::Initial => "Generated code",
                    TurnKind::Update => "Updated code",
                };
                println!("\n📝 {} (v{}):\n", heading, accepted.version);
                self.code_block(&accepted.code);
                if accepted.pushed {
                    println!("\n✅ Code sent to Strudel server!");
                } else {
                    println!("\n⚠️  Code not delivered to Strudel server");
                }
            }
            Err(e) => println!("\n❌ Failed to generate code: {}", e),
        }
    }

    fn show_program(&self, snapshot: Option<&ProgramSnapshot>) {
        match snapshot {
            Some(snapshot) => {
                let status = if snapshot.delivered { "delivered" } else { "not delivered" };
                println!("\n📝 Current code (v{}, {}):", snapshot.version, status);
                self.code_block(&snapshot.code);
            }
            None => println!("\n❌ No code generated yet"),
        }
    }

    fn notice(&self, message: &str) {
        println!("\n{}", message);
    }

    fn ready_for_input(&self) {
        if self.show_prompt {
            print!("\n🎹 > ");
            let _ = io::stdout().flush();
        }
    }
}
