//! Request-processing core for the bounded-queue FIFO request service
//! server.
//!
//! The binaries in `src/bin/` are thin glue (CLI parsing, socket
//! bind/listen/accept); everything that matters — the admission queue,
//! the producer/consumer coordination, and the timing instrumentation —
//! lives here.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod queue;
pub mod timing;
pub mod wire;

mod consumer;
mod producer;
