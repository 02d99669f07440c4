//! Fixed-size sliding window over the most recent exchanges.
//!
//! A long live-coding session would otherwise grow the prompt without bound.
//! Eviction is FIFO by whole exchange, so the context never starts with a
//! dangling model reply.

use crate::core_types::Message;
use crate::memory::{ConversationMemory, MemoryStats};
use std::collections::VecDeque;

pub struct SlidingWindowMemory {
    exchanges: VecDeque<(Message, Message)>,
    max_exchanges: usize,
    evicted: usize,
}

impl SlidingWindowMemory {
    pub fn new(max_exchanges: usize) -> Self {
        let max_exchanges = max_exchanges.max(1);
        Self {
            exchanges: VecDeque::with_capacity(max_exchanges),
            max_exchanges,
            evicted: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }
}

impl ConversationMemory for SlidingWindowMemory {
    fn add_exchange(&mut self, request: Message, reply: Message) {
        if self.exchanges.len() >= self.max_exchanges {
            self.exchanges.pop_front();
            self.evicted += 1;
        }
        self.exchanges.push_back((request, reply));
    }

    fn get_context(&self) -> Vec<Message> {
        self.exchanges
            .iter()
            .flat_map(|(request, reply)| [request.clone(), reply.clone()])
            .collect()
    }

    fn stats(&self) -> MemoryStats {
        MemoryStats {
            exchanges: self.exchanges.len(),
            message_count: self.exchanges.len() * 2,
            evicted_exchanges: self.evicted,
        }
    }
}
