//! Session controller for the Minefront client.
//!
//! The service owns the rules; this crate owns the lifecycle of one
//! player's game. No I/O happens here: intents and service responses go
//! in, [`Effect`]s describing the requests to perform come out, which
//! keeps the whole state machine natively testable.

pub use error::*;
pub use identity::*;
pub use session::*;

mod error;
mod identity;
mod session;
