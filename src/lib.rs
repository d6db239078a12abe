//! Client-side session state machine for a simulated courtroom.
//!
//! A human litigant plays opposite AI-driven judge, prosecutor and clerk
//! roles run by an orchestration backend. This crate keeps the session's
//! observable state and turns the backend's event stream into it.
//!
//! # Layers
//! - [`store`]: immutable [`TrialState`] snapshots changed only through the
//!   closed [`Action`] set by a pure reducer.
//! - [`reconcile`]: maps inbound [`ServerEvent`]s onto store transitions,
//!   infers speaker roles and deduplicates human-side lines.
//! - [`session`]: the [`CourtSession`] facade a presentation layer drives
//!   (connect, respond, retry, disconnect, clear).
//!
//! The transport contract and wire types live in `court_protocol`.

pub mod config;
pub mod logging;
pub mod reconcile;
pub mod replay;
pub mod session;
pub mod store;

pub use court_protocol::{
    CaseInfo, CourtTransport, EventSink, Evidence, EvidenceProvider, EvidenceSelection,
    EvidenceSubmission, InputType, ServerEvent, TransportError, UserInput,
};

pub use crate::config::SessionConfig;
pub use crate::reconcile::{apply_event, DedupLedger, Fingerprint};
pub use crate::session::{ConnectOutcome, CourtSession, HostOps, UserRole};
pub use crate::store::{
    Action, ActiveNode, InterruptState, Message, MessageId, Role, TrialPhase, TrialState,
    TrialStore,
};
