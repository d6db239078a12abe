//! In-process mock of the `court_protocol` transport contract.
//!
//! `MockTransport` performs no I/O. It records every call into a shared
//! [`TransportTrace`] and lets the test-side [`MockHandle`] inject inbound
//! events into the sink captured at connect time.

use std::sync::{Arc, Mutex, MutexGuard};

use court_protocol::{
    CaseInfo, CourtTransport, EventSink, Evidence, ServerEvent, TransportError, UserInput,
};

/// Calls observed by a [`MockTransport`].
#[derive(Debug, Default)]
pub struct TransportTrace {
    pub connect_calls: usize,
    pub started_trials: Vec<(CaseInfo, Vec<Evidence>)>,
    pub sent_inputs: Vec<(String, UserInput)>,
    pub disconnect_calls: usize,
    pub connected: bool,
    pub thread_id: Option<String>,
    sink: Option<EventSink>,
}

#[derive(Debug)]
pub struct MockTransport {
    trace: Arc<Mutex<TransportTrace>>,
    connect_failure: Option<String>,
    start_failure: Option<String>,
    send_failure: Option<String>,
    script: Vec<ServerEvent>,
}

/// Test-side half of a [`MockTransport`].
#[derive(Debug, Clone)]
pub struct MockHandle {
    trace: Arc<Mutex<TransportTrace>>,
}

impl MockTransport {
    /// Creates a transport whose connect succeeds and emits `Open`.
    #[must_use]
    pub fn new() -> (Self, MockHandle) {
        Self::build(None, Vec::new())
    }

    /// Creates a transport whose handshake always fails with `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> (Self, MockHandle) {
        Self::build(Some(message.into()), Vec::new())
    }

    /// Creates a transport that emits `script` in order right after the trial
    /// start request is sent.
    #[must_use]
    pub fn with_script(script: Vec<ServerEvent>) -> (Self, MockHandle) {
        Self::build(None, script)
    }

    /// Accepts the connection but rejects the trial start request with
    /// `message`.
    #[must_use]
    pub fn with_start_failure(mut self, message: impl Into<String>) -> Self {
        self.start_failure = Some(message.into());
        self
    }

    /// Makes every subsequent `send_user_input` fail with `message`.
    #[must_use]
    pub fn with_send_failure(mut self, message: impl Into<String>) -> Self {
        self.send_failure = Some(message.into());
        self
    }

    fn build(connect_failure: Option<String>, script: Vec<ServerEvent>) -> (Self, MockHandle) {
        let trace = Arc::new(Mutex::new(TransportTrace::default()));
        (
            Self {
                trace: Arc::clone(&trace),
                connect_failure,
                start_failure: None,
                send_failure: None,
                script,
            },
            MockHandle { trace },
        )
    }
}

impl CourtTransport for MockTransport {
    fn connect(&mut self, sink: EventSink) -> Result<(), TransportError> {
        let mut trace = lock_unpoisoned(&self.trace);
        trace.connect_calls += 1;

        if let Some(message) = &self.connect_failure {
            return Err(TransportError::handshake(message.clone()));
        }

        trace.connected = true;
        sink.emit(ServerEvent::Open);
        trace.sink = Some(sink);
        Ok(())
    }

    fn start_trial(
        &mut self,
        case_info: &CaseInfo,
        evidence_list: &[Evidence],
    ) -> Result<(), TransportError> {
        let mut trace = lock_unpoisoned(&self.trace);
        if !trace.connected {
            return Err(TransportError::NotConnected);
        }

        if let Some(message) = &self.start_failure {
            return Err(TransportError::send(message.clone()));
        }

        trace
            .started_trials
            .push((case_info.clone(), evidence_list.to_vec()));

        for event in std::mem::take(&mut self.script) {
            record_and_emit(&mut trace, event);
        }

        Ok(())
    }

    fn send_user_input(
        &mut self,
        node_name: &str,
        input: &UserInput,
    ) -> Result<(), TransportError> {
        let mut trace = lock_unpoisoned(&self.trace);
        if !trace.connected {
            return Err(TransportError::NotConnected);
        }

        if let Some(message) = &self.send_failure {
            return Err(TransportError::send(message.clone()));
        }

        trace
            .sent_inputs
            .push((node_name.to_string(), input.clone()));
        Ok(())
    }

    fn disconnect(&mut self) {
        let mut trace = lock_unpoisoned(&self.trace);
        trace.disconnect_calls += 1;
        trace.connected = false;
        trace.thread_id = None;
        trace.sink = None;
    }

    fn is_connected(&self) -> bool {
        lock_unpoisoned(&self.trace).connected
    }

    fn thread_id(&self) -> Option<String> {
        lock_unpoisoned(&self.trace).thread_id.clone()
    }
}

impl MockHandle {
    /// Simulates one inbound frame. Returns false when no connection is open.
    pub fn emit(&self, event: ServerEvent) -> bool {
        let mut trace = lock_unpoisoned(&self.trace);
        if trace.sink.is_none() {
            return false;
        }

        record_and_emit(&mut trace, event);
        true
    }

    /// Returns the sink captured by the most recent successful connect.
    #[must_use]
    pub fn sink(&self) -> Option<EventSink> {
        lock_unpoisoned(&self.trace).sink.clone()
    }

    #[must_use]
    pub fn connect_calls(&self) -> usize {
        lock_unpoisoned(&self.trace).connect_calls
    }

    #[must_use]
    pub fn disconnect_calls(&self) -> usize {
        lock_unpoisoned(&self.trace).disconnect_calls
    }

    #[must_use]
    pub fn started_trials(&self) -> Vec<(CaseInfo, Vec<Evidence>)> {
        lock_unpoisoned(&self.trace).started_trials.clone()
    }

    #[must_use]
    pub fn sent_inputs(&self) -> Vec<(String, UserInput)> {
        lock_unpoisoned(&self.trace).sent_inputs.clone()
    }
}

fn record_and_emit(trace: &mut TransportTrace, event: ServerEvent) {
    match &event {
        ServerEvent::SessionCreated(data) => trace.thread_id = Some(data.thread_id.clone()),
        ServerEvent::Close => {
            trace.connected = false;
            trace.thread_id = None;
        }
        _ => {}
    }

    if let Some(sink) = &trace.sink {
        sink.emit(event);
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
