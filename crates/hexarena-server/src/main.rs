//! Hexarena simulation server.

use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod protocol;
mod remote;
mod server;
mod session;

use hexarena_core::{DecisionProvider, HeuristicProvider, Strategy};
use remote::{RemoteConfig, RemoteProvider};
use server::ServerState;
use session::Arena;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse address from env or use default
    let addr: SocketAddr = std::env::var("SERVER_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".into())
        .parse()?;

    info!("Starting Hexarena server...");

    let config = RemoteConfig::from_env();
    let (roster, providers) = default_roster(&config);
    let state = Arc::new(ServerState::new(Arena::new(roster, providers)));

    tokio::spawn(server::run_autoplay(Arc::clone(&state)));

    server::run_server(addr, state).await
}

/// One provider per seat: remote for the model-backed strategies, heuristic
/// rules otherwise.
fn default_roster(config: &RemoteConfig) -> (Vec<Strategy>, Vec<Arc<dyn DecisionProvider>>) {
    let roster = Strategy::ALL.to_vec();
    let providers = roster
        .iter()
        .map(|&strategy| match strategy.model_id() {
            Some(model) => {
                Arc::new(RemoteProvider::new(config.clone(), model)) as Arc<dyn DecisionProvider>
            }
            None => Arc::new(HeuristicProvider::new(strategy)) as Arc<dyn DecisionProvider>,
        })
        .collect();
    (roster, providers)
}
