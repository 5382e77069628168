use log::{error, info};
use std::collections::BTreeMap;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Mutex};

use crate::client::handle_connection;
use crate::config::ServerConfig;
use crate::error::{FrameError, SendError};
use crate::protocol::framing::write_frame;
use crate::protocol::responses::SERVER_EXIT;
use crate::registry::{ClientId, Registry};

/// The administrative shutdown sentinel, one line on the admin stream.
pub const SHUTDOWN_SENTINEL: &str = "EXIT";

/// Everything the command processor touches: the name registries plus the
/// write half of every live connection, keyed by handle. `BTreeMap` keeps
/// broadcast order deterministic (ascending handle order).
///
/// All of it lives behind one `Mutex`, so a command runs to completion,
/// including its deliveries and acknowledgement, before the next one starts.
pub struct ServerState {
    pub registry: Registry,
    connections: BTreeMap<ClientId, OwnedWriteHalf>,
}

pub type SharedState = Arc<Mutex<ServerState>>;

impl ServerState {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            connections: BTreeMap::new(),
        }
    }

    /// Park the write half of a newly accepted connection.
    pub fn attach(&mut self, id: ClientId, writer: OwnedWriteHalf) {
        self.connections.insert(id, writer);
    }

    /// Write a response frame back to the requesting connection.
    ///
    /// A failure here means the requester itself is gone; the caller ends
    /// the session.
    pub async fn send_to(&mut self, id: ClientId, body: &str) -> Result<(), FrameError> {
        match self.connections.get_mut(&id) {
            Some(writer) => write_frame(writer, body).await,
            None => Err(FrameError::IoError(io::Error::new(
                io::ErrorKind::NotConnected,
                format!("connection {} is gone", id),
            ))),
        }
    }

    /// Deliver a message frame to a peer connection.
    ///
    /// Any write failure is reported as the peer being unreachable; the
    /// peer's registration is left alone (only its own socket teardown
    /// deregisters it).
    pub async fn deliver(&mut self, id: ClientId, body: &str) -> Result<(), SendError> {
        let writer = self
            .connections
            .get_mut(&id)
            .ok_or(SendError::PeerUnreachable(id))?;
        write_frame(writer, body)
            .await
            .map_err(|_| SendError::PeerUnreachable(id))
    }

    /// Frame `body` to every live connection in ascending handle order,
    /// ignoring per-connection failures.
    pub async fn broadcast(&mut self, body: &str) {
        for writer in self.connections.values_mut() {
            let _ = write_frame(writer, body).await;
        }
    }

    /// Tear down one connection: drop its write half, unregister its name,
    /// and purge it from every group.
    pub fn drop_connection(&mut self, id: ClientId) -> Option<String> {
        self.connections.remove(&id);
        self.registry.unregister(id)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

/// The relay server: a listening socket plus the shared state every
/// connection task works against.
pub struct Server {
    listener: TcpListener,
    state: SharedState,
}

impl Server {
    /// Bind the listening socket. A bind failure is fatal to the process;
    /// the caller logs it and exits nonzero.
    pub async fn bind(config: &ServerConfig) -> io::Result<Self> {
        let listener = TcpListener::bind(config.socket_addr()).await?;
        info!("Server bound to {}", listener.local_addr()?);
        Ok(Self {
            listener,
            state: Arc::new(Mutex::new(ServerState::new())),
        })
    }

    /// The address the server actually listens on (relevant with port 0).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until the shutdown sentinel arrives on the admin channel.
    ///
    /// Returns `Ok(())` after an orderly shutdown (every client was sent
    /// `server_exit`). An accept failure on the listening socket is fatal
    /// and is returned to the caller.
    pub async fn run(self, mut admin: mpsc::Receiver<String>) -> io::Result<()> {
        let Server { listener, state } = self;
        let mut next_id: ClientId = 0;
        let mut admin_open = true;

        loop {
            tokio::select! {
                line = admin.recv(), if admin_open => match line {
                    Some(line) if line == SHUTDOWN_SENTINEL => {
                        let mut state = state.lock().await;
                        info!(
                            "EXIT command is typed: server is shutting down ({} connections open)",
                            state.connection_count()
                        );
                        state.broadcast(SERVER_EXIT).await;
                        return Ok(());
                    }
                    Some(line) => error!("ERROR: invalid input: {:?}", line),
                    // Admin stream closed; keep serving without it.
                    None => admin_open = false,
                },
                accepted = listener.accept() => {
                    let (stream, addr) = match accepted {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            error!("Error accepting connection: {}", e);
                            return Err(e);
                        }
                    };

                    let id = next_id;
                    next_id += 1;

                    let (reader, writer) = stream.into_split();
                    state.lock().await.attach(id, writer);
                    info!("Accepted connection from {} (handle {})", addr, id);

                    let state = Arc::clone(&state);
                    tokio::spawn(async move {
                        handle_connection(reader, id, addr, state).await;
                    });
                }
            }
        }
    }
}
