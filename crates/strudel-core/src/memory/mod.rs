//! Conversation context retained between turns.
//!
//! The model sees the system preamble, then whatever the memory hands back from
//! `get_context`, then the new request. Memories only ever store complete
//! exchanges (request plus accepted code) so a failed turn leaves no trace.

pub mod sliding_window;

use crate::core_types::Message;
pub use sliding_window::SlidingWindowMemory;

pub trait ConversationMemory: Send + Sync {
    /// Records one accepted exchange.
    fn add_exchange(&mut self, request: Message, reply: Message);
    fn get_context(&self) -> Vec<Message>;
    fn stats(&self) -> MemoryStats {
        MemoryStats::default()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryStats {
    pub exchanges: usize,
    pub message_count: usize,
    pub evicted_exchanges: usize,
}
