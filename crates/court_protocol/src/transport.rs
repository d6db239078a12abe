use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::TransportError;
use crate::wire::{CaseInfo, Evidence, ServerEvent, UserInput};

/// Shared FIFO the transport emits inbound events into.
///
/// Clones share the same queue. The session side drains it on its own loop,
/// so events are applied in emission order and never re-entrantly.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    queue: Arc<Mutex<VecDeque<ServerEvent>>>,
}

impl EventSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues one inbound event. Safe to call from any thread.
    pub fn emit(&self, event: ServerEvent) {
        lock_unpoisoned(&self.queue).push_back(event);
    }

    /// Removes and returns every queued event in emission order.
    pub fn drain(&self) -> Vec<ServerEvent> {
        lock_unpoisoned(&self.queue).drain(..).collect()
    }

    /// Removes and returns the oldest queued event.
    pub fn pop(&self) -> Option<ServerEvent> {
        lock_unpoisoned(&self.queue).pop_front()
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        lock_unpoisoned(&self.queue).len()
    }

    /// Returns true when both handles feed the same queue.
    #[must_use]
    pub fn same_queue(&self, other: &EventSink) -> bool {
        Arc::ptr_eq(&self.queue, &other.queue)
    }
}

/// Bidirectional channel to the courtroom orchestration backend.
///
/// Implementations own connection-level timeouts and report them by emitting
/// a `ServerEvent::Error` carrying [`crate::TRANSPORT_ERROR_CODE`].
pub trait CourtTransport {
    /// Opens the channel. Every inbound event from this connection is emitted
    /// into `sink`, including `Open` and `Close`.
    fn connect(&mut self, sink: EventSink) -> Result<(), TransportError>;

    /// Sends the initial case configuration and evidence roster.
    fn start_trial(
        &mut self,
        case_info: &CaseInfo,
        evidence_list: &[Evidence],
    ) -> Result<(), TransportError>;

    /// Sends the human's answer to the interrupt raised by `node_name`.
    fn send_user_input(&mut self, node_name: &str, input: &UserInput)
        -> Result<(), TransportError>;

    /// Closes the channel. Idempotent.
    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    fn thread_id(&self) -> Option<String>;
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
