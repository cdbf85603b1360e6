//! WebSocket protocol messages for the arena control panel.

use hexarena_core::{Board, Strategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// Advance the game by one step
    Step,

    /// Toggle continuous play
    TogglePlay,

    /// Reset to a fresh game (the win tally is kept)
    Reset,

    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// Welcome message with assigned client ID and the static board layout
    Welcome { client_id: Uuid, board: Board },

    /// Read-only game state snapshot
    Snapshot { state: serde_json::Value },

    /// The game was reset; clients drop their log and start over
    NewGame { state: serde_json::Value },

    /// New chronological log lines (append-only)
    Log { lines: Vec<String> },

    /// A remote decision started or finished for the given seat
    Thinking { player: usize, active: bool },

    /// Continuous play was toggled
    Playing { playing: bool },

    /// Cumulative wins per strategy
    WinTally { tally: HashMap<Strategy, u32> },

    /// A player reached the point threshold
    GameOver {
        winner: usize,
        name: String,
        points: u32,
    },

    /// Error occurred
    Error { message: String },

    /// Pong response
    Pong,
}
