//! Client protocol layer for a remote, stateful refactoring engine.
//!
//! This crate lets an editing environment drive a refactoring engine
//! process over request/response calls. It owns the engine process
//! lifecycle, the typed command dispatch, the server-authoritative
//! undo/redo history view, and the post-mutation buffer
//! reconciliation hook. It deliberately does not implement any
//! refactoring logic itself: the engine is an opaque remote
//! collaborator.
//!
//! Start at [`Engine`]; the wire format and the closed command
//! catalog live in the `refract-protocol` crate.

pub mod config;
pub mod engine;
pub mod error;
pub mod rpc;
pub mod session;
pub mod sync;

pub use config::{EngineConfig, NetworkDefaults, ProgramSpec};
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use session::{SessionManager, SessionState};
pub use sync::{BufferSync, NoopSync};

// Re-export the protocol surface so editors only need one dependency.
pub use refract_protocol::{
    Command, CompletionProposal, HistoryEntry, Resource, ResourceKind, RpcFault, RpcRequest,
    RpcResponse,
};
