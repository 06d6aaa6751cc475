//! # FileDrop
//!
//! A minimal remote file-storage service:
//! - Line-based TCP protocol (`list`, `delete`, `rename`, `upload`, `download`)
//! - One connection per command, one thread per connection
//! - Streaming transfers terminated by half-close, no length header
//! - Flat storage root on the server, download directory on the client
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────┐                      ┌─────────────────────────────┐
//! │    Client    │ ── request line ───▶ │  Server (accept loop)       │
//! │ (one command │                      │   └─ Session per connection │
//! │  at a time)  │ ◀── status/bytes ─── │        └─ Dispatcher        │
//! └──────┬───────┘                      └──────┬───────────┬──────────┘
//!        │                                     │           │
//!        ▼                                     ▼           ▼
//! ┌──────────────┐                      ┌───────────┐ ┌──────────┐
//! │   Transfer   │                      │ Transfer  │ │ Storage  │
//! │ (handshake,  │                      │ (send /   │ │ (flat    │
//! │  send/recv)  │                      │  receive) │ │  root)   │
//! └──────────────┘                      └───────────┘ └──────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod transfer;
pub mod storage;
pub mod dispatcher;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{FileDropError, Result};
pub use config::{ClientConfig, Config};
pub use dispatcher::Dispatcher;
pub use client::Client;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of FileDrop
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
