use anyhow::Context;
use employee_server::{Server, ServerState, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. dotenv, config, logging
    let config = setup_environment();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Employee server starting..."
    );

    // 2. database + unit-of-work factory
    let state = ServerState::initialize(&config)
        .await
        .context("failed to initialize server state")?;

    // 3. serve until Ctrl-C
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
