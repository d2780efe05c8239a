use org_server::{Server, ServerState, setup_environment};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. dotenv, config, logging
    let config = setup_environment()?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Org server starting...");

    // 2. Database and services
    let state = ServerState::initialize(&config).await?;

    // 3. HTTP until ctrl-c
    let server = Server::new(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
