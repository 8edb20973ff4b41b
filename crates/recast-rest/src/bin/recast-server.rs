//! Timer REST server binary for Recast.

use recast_rest::TimersApi;
use recast_store::{Channel, ChannelRegistry, InMemoryTimerStore, RecordingTracker};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone)]
struct ServerConfig {
    /// Server address to bind to
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8002".to_string(),
        }
    }
}

impl ServerConfig {
    fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(addr) = std::env::var("RECAST_ADDR") {
            config.addr = addr;
        }
        config
    }
}

// TODO: load the lineup from a channels.conf once the tuner backend
// provides one
fn starter_lineup() -> ChannelRegistry {
    ChannelRegistry::with_channels(vec![
        Channel {
            id: "S19.2E-1-1019-10301".to_string(),
            number: 1,
            name: "Das Erste HD".to_string(),
        },
        Channel {
            id: "S19.2E-1-1011-11110".to_string(),
            number: 2,
            name: "ZDF HD".to_string(),
        },
        Channel {
            id: "S19.2E-1-1107-17500".to_string(),
            number: 3,
            name: "arte HD".to_string(),
        },
    ])
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recast_server=debug,recast_rest=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();

    info!("Starting Recast Timer Server");
    info!("Listening on: {}", config.addr);

    let api = Arc::new(TimersApi::new(
        Arc::new(InMemoryTimerStore::new()),
        Arc::new(starter_lineup()),
        Arc::new(RecordingTracker::new()),
    ));

    let app = api.router().layer(TraceLayer::new_for_http());

    let listener = match TcpListener::bind(&config.addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", config.addr, e);
            return;
        }
    };

    info!("Timer server ready to accept connections");
    info!("API endpoints:");
    info!("  List timers: GET /timers.{{json,html,xml}}?start=&limit=");
    info!("  Create timer: POST /timers");
    info!("  Update timer: PUT /timers");
    info!("  Delete timer: DELETE /timers/{{id}}");

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
    }
}
