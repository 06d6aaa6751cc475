//! TCP Server
//!
//! Accepts connections and hands each to its own session thread.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::sync::WaitGroup;

use crate::config::Config;
use crate::dispatcher::{messages, Dispatcher};
use crate::error::{FileDropError, Result};
use crate::protocol::{read_request, write_status, Status};
use crate::storage::{FileStorage, LocalStorage};

use super::Session;

/// How long the accept loop sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long a rejected client gets to send its request line
const BUSY_DRAIN_TIMEOUT: Duration = Duration::from_millis(100);

/// TCP server for FileDrop
///
/// ## Concurrency
/// - One acceptor (the thread calling [`run`](Server::run))
/// - One thread per connection, owning it end-to-end
/// - No shared state between sessions besides the storage root
pub struct Server<S: FileStorage + 'static> {
    config: Config,
    dispatcher: Arc<Dispatcher<S>>,
    listener: TcpListener,

    /// Sessions currently running
    active: Arc<AtomicUsize>,

    /// Set to stop the accept loop
    shutdown: Arc<AtomicBool>,
}

impl Server<LocalStorage> {
    /// Bind a server over the configured storage root directory
    pub fn bind(config: Config) -> Result<Self> {
        let storage = LocalStorage::open(&config.storage_root)?;
        tracing::info!("Serving files from {}", storage.root().display());
        Self::with_storage(config, storage)
    }
}

impl<S: FileStorage + 'static> Server<S> {
    /// Bind a server over any storage implementation
    pub fn with_storage(config: Config, storage: S) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(&config.listen_addr)?;
        // Polled so the loop can notice shutdown
        listener.set_nonblocking(true)?;

        let dispatcher = Arc::new(Dispatcher::new(storage, config.chunk_size));

        Ok(Self {
            config,
            dispatcher,
            listener,
            active: Arc::new(AtomicUsize::new(0)),
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Address the listener is bound to (resolves port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Number of sessions currently being served
    pub fn active_sessions(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// A handle that can stop [`run`](Server::run) from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
        }
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    /// Accept connections until shutdown, then wait for running sessions
    pub fn run(&self) -> Result<()> {
        tracing::info!("Listening on {}", self.local_addr()?);

        let sessions = WaitGroup::new();

        while !self.shutdown.load(Ordering::Acquire) {
            match self.listener.accept() {
                Ok((stream, peer)) => self.spawn_session(stream, peer, sessions.clone()),
                Err(e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(ACCEPT_POLL_INTERVAL),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    // e.g. out of file descriptors; keep serving
                    tracing::warn!("Accept failed: {}", e);
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }

        tracing::info!(
            "Shutting down, waiting for {} session(s)",
            self.active_sessions()
        );
        sessions.wait();
        Ok(())
    }

    fn spawn_session(&self, mut stream: TcpStream, peer: SocketAddr, done: WaitGroup) {
        tracing::debug!("Accepted connection from {}", peer);

        // Some platforms let accepted sockets inherit the listener's mode
        if let Err(e) = stream.set_nonblocking(false) {
            tracing::warn!("Dropping connection from {}: {}", peer, e);
            return;
        }

        let slot = match SessionSlot::acquire(&self.active, self.config.max_connections) {
            Some(slot) => slot,
            None => {
                tracing::warn!("Connection limit reached, rejecting {}", peer);
                // Draining can take BUSY_DRAIN_TIMEOUT; keep it off the accept loop
                let rejected = thread::Builder::new()
                    .name(format!("reject-{}", peer))
                    .spawn(move || reject_busy(&mut stream));
                if let Err(e) = rejected {
                    tracing::error!("Could not spawn rejection thread for {}: {}", peer, e);
                }
                return;
            }
        };

        let dispatcher = Arc::clone(&self.dispatcher);
        let read_timeout = self.config.read_timeout();
        let write_timeout = self.config.write_timeout();

        let spawned = thread::Builder::new()
            .name(format!("session-{}", peer))
            .spawn(move || {
                let _slot = slot;
                let _done = done;

                let result = Session::new(stream, dispatcher).and_then(|mut session| {
                    session.set_timeouts(read_timeout, write_timeout)?;
                    session.handle()
                });
                if let Err(e) = result {
                    tracing::warn!("Session with {} failed: {}", peer, e);
                }
            });

        if let Err(e) = spawned {
            tracing::error!("Could not spawn session thread for {}: {}", peer, e);
        }
    }
}

/// Tell a client over the connection limit to go away
///
/// The request is read first: closing with unread input resets the
/// connection, which can discard the reply before the client sees it.
fn reject_busy(stream: &mut TcpStream) {
    let drained = stream
        .set_read_timeout(Some(BUSY_DRAIN_TIMEOUT))
        .map_err(FileDropError::from)
        .and_then(|_| read_request(stream));
    if let Err(e) = drained {
        tracing::debug!("No request from rejected client: {}", e);
    }
    if let Err(e) = write_status(stream, &Status::error(messages::SERVER_BUSY)) {
        tracing::debug!("Could not send busy reply: {}", e);
    }
}

/// Stops a running [`Server`] from another thread
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Ask the accept loop to stop
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Counts one running session against the connection limit
struct SessionSlot {
    active: Arc<AtomicUsize>,
}

impl SessionSlot {
    fn acquire(active: &Arc<AtomicUsize>, limit: usize) -> Option<Self> {
        if active.fetch_add(1, Ordering::AcqRel) >= limit {
            active.fetch_sub(1, Ordering::AcqRel);
            return None;
        }
        Some(Self {
            active: Arc::clone(active),
        })
    }
}

impl Drop for SessionSlot {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::AcqRel);
    }
}
