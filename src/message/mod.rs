//! This module exports a minimal message-passing API, which is encapsulated
//! by a `Communicator` trait. Implementors only need to write `send` and
//! `recv` operations for a given transport layer (an in-process transport
//! over crossbeam channels is included). The trait then provides default
//! implementations for broadcast, reduce, and reduce-all operations, and for
//! the floating point extremum reductions used to agree on a time step.
//!

pub mod channel;
pub mod comm;
pub mod util;

pub use channel::{ChannelCommunicator, SelfCommunicator};
pub use comm::Communicator;
