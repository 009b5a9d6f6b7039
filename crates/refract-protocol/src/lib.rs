//! Wire format and command catalog for the refract engine protocol.
//!
//! This crate is pure data: the JSON-RPC envelopes exchanged with the
//! refactoring engine, the closed catalog of commands the engine
//! understands, and the types its responses decode into. The actual
//! transport, session lifecycle, and dispatch policy live in
//! `refract-client`.

pub mod command;
pub mod types;
pub mod wire;

pub use command::Command;
pub use types::{CompletionProposal, HistoryEntry, Resource, ResourceKind};
pub use wire::{RpcFault, RpcRequest, RpcResponse};
