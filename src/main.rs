use std::sync::Arc;

use tracing::{error, info};

use roomcast::{ChatRoom, ChatServer, Config};

#[tokio::main]
async fn main() {
    // Load configuration
    let mut config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Environment overrides are all-or-nothing; a bad one keeps the loaded values
    if let Err(e) = config.apply_env_overrides() {
        eprintln!("Ignoring environment overrides: {e}");
    }

    // Initialize logging
    if let Err(e) = roomcast::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        roomcast::logging::init_console_only(&config.logging.level);
    }

    info!("roomcast - room \"{}\"", config.room.name);

    let room = Arc::new(ChatRoom::from_config(&config.room));
    let server = match ChatServer::bind(&config.server).await {
        Ok(server) => server,
        Err(e) => {
            error!(
                "Failed to bind {}:{}: {}",
                config.server.host, config.server.port, e
            );
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run(room, config.room.queue_capacity).await {
        error!("Server stopped: {}", e);
    }
}
