//! Message-passing layer: communicator backends, wire records and the
//! per-round collectives of the relaxation engine.

pub mod communicator;
pub mod exchange;
pub mod wire;

pub use communicator::{CommTag, Communicator, NoComm, ThreadComm, Wait};
pub use exchange::{exchange_updates, reduce_any};
