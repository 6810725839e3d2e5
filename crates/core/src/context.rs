//! The per-handler execution context.

use floe_db::Store;
use floe_primitives::events::{Event, EventSink};

/// Everything a handler sees while it runs: the (usually overlaid) store,
/// the block clock, and the event buffer.
///
/// Handlers run to completion or abort; the caller decides whether the
/// store the context wraps gets committed.
#[derive(Debug)]
pub struct Context<'a> {
    /// The store all reads and writes go through.
    pub store: &'a dyn Store,

    /// Block time in unix seconds.
    pub block_time: u64,

    /// Block height.
    pub block_height: u64,

    /// Events emitted so far.
    pub events: Vec<Event>,
}

impl<'a> Context<'a> {
    /// Creates a context over a store at the given block clock.
    pub fn new(store: &'a dyn Store, block_time: u64, block_height: u64) -> Self {
        Self {
            store,
            block_time,
            block_height,
            events: Vec::new(),
        }
    }
}

impl EventSink for Context<'_> {
    fn emit(&mut self, event: Event) {
        self.events.push(event);
    }
}
