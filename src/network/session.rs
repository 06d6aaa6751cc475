//! Connection Session
//!
//! Handles one client connection: one command, then close.

use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::protocol::read_request;
use crate::storage::FileStorage;

/// Owns a single accepted connection end-to-end
///
/// The socket is read unbuffered: a buffered reader could pull upload
/// bytes into its buffer along with the request line.
pub struct Session<S: FileStorage> {
    /// The client socket; dropped (closed) when the session ends
    stream: TcpStream,

    /// Shared command executor
    dispatcher: Arc<Dispatcher<S>>,

    /// Peer address for logging
    peer_addr: String,
}

impl<S: FileStorage> Session<S> {
    /// Create a new session for an accepted connection
    pub fn new(stream: TcpStream, dispatcher: Arc<Dispatcher<S>>) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Replies are small and latency-bound
        stream.set_nodelay(true)?;

        Ok(Self {
            stream,
            dispatcher,
            peer_addr,
        })
    }

    /// Configure connection timeouts (`None` blocks indefinitely)
    pub fn set_timeouts(&mut self, read: Option<Duration>, write: Option<Duration>) -> Result<()> {
        self.stream.set_read_timeout(read)?;
        self.stream.set_write_timeout(write)?;
        Ok(())
    }

    /// Serve the connection's single command, then close it
    ///
    /// Disconnects and timeouts end the session quietly; other failures are
    /// returned for the caller to report.
    ///
    /// The socket and any file the dispatcher opened are released on every
    /// return path, including errors.
    pub fn handle(mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        let request = match read_request(&mut self.stream) {
            Ok(Some(request)) => request,
            Ok(None) => {
                tracing::debug!("Client {} closed before sending a command", self.peer_addr);
                return Ok(());
            }
            Err(e) if e.is_disconnect() || e.is_timeout() => {
                tracing::debug!("No command from {}: {}", self.peer_addr, e);
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        tracing::trace!("Received request from {}: {:?}", self.peer_addr, request);

        match self.dispatcher.dispatch(request, &mut self.stream) {
            Ok(()) => {
                tracing::debug!("Connection closed with {}", self.peer_addr);
                Ok(())
            }
            Err(e) if e.is_disconnect() => {
                tracing::debug!("Client {} disconnected mid-exchange: {}", self.peer_addr, e);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
