//! Network Module
//!
//! TCP server and per-connection sessions.
//!
//! ## Architecture
//! - Single acceptor thread
//! - One thread per connection, one command per connection
//! - Commands routed through the Dispatcher

mod server;
mod session;

pub use server::{Server, ShutdownHandle};
pub use session::Session;
