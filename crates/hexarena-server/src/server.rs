//! WebSocket server and connection handling.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::session::Arena;
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use hexarena_core::Board;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio::time::MissedTickBehavior;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Interval between automatic steps while continuous play is on
const AUTOPLAY_INTERVAL: Duration = Duration::from_millis(800);

/// Server state shared across all connections.
pub struct ServerState {
    /// The single shared arena session
    pub arena: Mutex<Arena>,
    /// Mapping from client ID to their message sender
    pub clients: DashMap<Uuid, mpsc::UnboundedSender<ServerMessage>>,
}

impl ServerState {
    pub fn new(arena: Arena) -> Self {
        Self {
            arena: Mutex::new(arena),
            clients: DashMap::new(),
        }
    }

    /// Send a message to a specific client.
    pub fn send_to_client(&self, client_id: Uuid, msg: ServerMessage) {
        if let Some(sender) = self.clients.get(&client_id) {
            let _ = sender.send(msg);
        }
    }

    /// Broadcast a message to every connected client.
    pub fn broadcast(&self, msg: ServerMessage) {
        for entry in self.clients.iter() {
            let _ = entry.value().send(msg.clone());
        }
    }
}

/// Run the WebSocket server.
pub async fn run_server(addr: SocketAddr, state: Arc<ServerState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Hexarena server listening on {}", addr);

    while let Ok((stream, peer_addr)) = listener.accept().await {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }

    Ok(())
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New WebSocket connection from {}", addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Assign a client ID
    let client_id = Uuid::new_v4();

    // Create channel for outgoing messages
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.clients.insert(client_id, tx);

    // Welcome message carries the static board layout
    let welcome = ServerMessage::Welcome {
        client_id,
        board: Board::standard(),
    };
    let msg_text = serde_json::to_string(&welcome)?;
    ws_sender.send(Message::Text(msg_text.into())).await?;

    // Catch the client up on the running session
    {
        let arena = state.arena.lock().await;
        state.send_to_client(
            client_id,
            ServerMessage::Snapshot {
                state: arena.snapshot(),
            },
        );
        state.send_to_client(
            client_id,
            ServerMessage::Log {
                lines: arena.log().to_vec(),
            },
        );
        state.send_to_client(
            client_id,
            ServerMessage::WinTally {
                tally: arena.tally().clone(),
            },
        );
        state.send_to_client(
            client_id,
            ServerMessage::Playing {
                playing: arena.is_playing(),
            },
        );
    }

    // Spawn task to forward messages from channel to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(text) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    // Handle incoming messages
    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if let Ok(client_msg) = serde_json::from_str::<ClientMessage>(&text) {
                    handle_message(client_id, client_msg, &state).await;
                } else {
                    warn!("Invalid message from {}: {}", client_id, text);
                    state.send_to_client(
                        client_id,
                        ServerMessage::Error {
                            message: format!("unrecognized message: {text}"),
                        },
                    );
                }
            }
            Ok(Message::Close(_)) => {
                info!("Client {} closing connection", client_id);
                break;
            }
            Ok(Message::Ping(_)) => {
                state.send_to_client(client_id, ServerMessage::Pong);
            }
            Err(e) => {
                error!("WebSocket error from {}: {}", client_id, e);
                break;
            }
            _ => {}
        }
    }

    // Clean up on disconnect
    state.clients.remove(&client_id);
    send_task.abort();

    info!("Connection closed for {}", client_id);
    Ok(())
}

/// Handle a client command.
async fn handle_message(client_id: Uuid, msg: ClientMessage, state: &Arc<ServerState>) {
    match msg {
        ClientMessage::Step => run_step(state).await,

        ClientMessage::TogglePlay => {
            let playing = {
                let mut arena = state.arena.lock().await;
                arena.toggle_play()
            };
            info!(playing, "continuous play toggled");
            state.broadcast(ServerMessage::Playing { playing });
        }

        ClientMessage::Reset => {
            let (snapshot, lines, tally) = {
                let mut arena = state.arena.lock().await;
                arena.reset();
                (
                    arena.snapshot(),
                    arena.log().to_vec(),
                    arena.tally().clone(),
                )
            };
            info!("game reset");
            state.broadcast(ServerMessage::NewGame { state: snapshot });
            state.broadcast(ServerMessage::Log { lines });
            state.broadcast(ServerMessage::WinTally { tally });
        }

        ClientMessage::Ping => {
            state.send_to_client(client_id, ServerMessage::Pong);
        }
    }
}

/// Drive one step of the shared session, broadcasting snapshots, log lines,
/// and thinking transitions as they happen. The session lock is released
/// while a remote decision is in flight; only the thinking flag keeps other
/// steps out.
pub async fn run_step(state: &Arc<ServerState>) {
    let pending = {
        let mut arena = state.arena.lock().await;
        if arena.is_blocked() {
            return;
        }

        if arena.state().is_setup() {
            let lines = arena.step_setup();
            let snapshot = arena.snapshot();
            drop(arena);
            if !lines.is_empty() {
                state.broadcast(ServerMessage::Log { lines });
            }
            state.broadcast(ServerMessage::Snapshot { state: snapshot });
            return;
        }

        let Some((pending, lines)) = arena.start_turn() else {
            return;
        };
        let snapshot = arena.snapshot();
        drop(arena);

        if !lines.is_empty() {
            state.broadcast(ServerMessage::Log { lines });
        }
        state.broadcast(ServerMessage::Snapshot { state: snapshot });
        state.broadcast(ServerMessage::Thinking {
            player: pending.seat,
            active: true,
        });
        pending
    };

    let seat = pending.seat;
    let resolved = pending.resolve().await;

    let mut arena = state.arena.lock().await;
    let lines = arena.finish_turn(resolved);
    let snapshot = arena.snapshot();
    let winner = arena.state().winner.map(|winning_seat| {
        let champion = &arena.state().players[winning_seat];
        (winning_seat, champion.name.clone(), champion.points)
    });
    let tally = arena.tally().clone();
    drop(arena);

    state.broadcast(ServerMessage::Thinking {
        player: seat,
        active: false,
    });
    if !lines.is_empty() {
        state.broadcast(ServerMessage::Log { lines });
    }
    state.broadcast(ServerMessage::Snapshot { state: snapshot });

    if let Some((winner, name, points)) = winner {
        info!(winner, %name, points, "game over");
        state.broadcast(ServerMessage::WinTally { tally });
        state.broadcast(ServerMessage::Playing { playing: false });
        state.broadcast(ServerMessage::GameOver {
            winner,
            name,
            points,
        });
    }
}

/// Automatic play driver: one step roughly every 800 ms while playing,
/// pausing while a decision is outstanding or once a winner is recorded.
pub async fn run_autoplay(state: Arc<ServerState>) {
    let mut ticker = tokio::time::interval(AUTOPLAY_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let should_step = {
            let arena = state.arena.lock().await;
            arena.is_playing() && !arena.is_blocked()
        };
        if should_step {
            run_step(&state).await;
        }
    }
}
