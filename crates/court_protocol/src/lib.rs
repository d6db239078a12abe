//! Wire contract between the courtroom session client and its orchestration
//! backend.
//!
//! This crate defines inbound event payloads, outbound response payloads, the
//! JSON frame codec and the [`CourtTransport`] seam. It contains no session
//! state; reconciliation of events into UI state lives in `court_session`.

mod codec;
mod error;
mod transport;
mod wire;

pub use codec::{decode_server_frame, encode_client_command, ClientCommand, ServerFrame};
pub use error::{ProtocolError, TransportError};
pub use transport::{CourtTransport, EventSink};
pub use wire::{
    CaseInfo, ErrorEvent, Evidence, EvidenceProvider, EvidenceSelection, EvidenceSubmission,
    InputType, InterruptRequest, NodeExecuted, Rounds, ServerEvent, SessionCreated, UserInput,
    WireMessage, TRANSPORT_ERROR_CODE,
};
