// Server module entry point
// Listener setup, connection handling, accept loop and shutdown signals

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module is renamed
#[path = "loop.rs"]
pub mod server_loop;

use std::sync::Arc;
use tokio::sync::Notify;

use crate::config::{AppState, Config};
use crate::error::StartupError;
use crate::logger;

// Re-export common types
pub use listener::create_reusable_listener;
pub use server_loop::start_server_loop;

/// Bind, serve until SIGINT/SIGTERM, then drain
pub async fn run(config: Config) -> Result<(), StartupError> {
    let addr = config.get_socket_addr()?;
    let listener = create_reusable_listener(addr)?;
    let bound = listener.local_addr()?;

    logger::log_server_start(&bound, &config);

    let state = Arc::new(AppState::new(config));
    let shutdown = Arc::new(Notify::new());
    signal::start_signal_handler(Arc::clone(&shutdown));

    start_server_loop(listener, state, shutdown).await;
    Ok(())
}
