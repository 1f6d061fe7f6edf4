use std::collections::HashMap;
use std::sync::Arc;

use pollcast::bot::Bot;
use pollcast::config::BotConfig;
use pollcast::feed::hub::HubClient;
use pollcast::frames::FrameResolver;

/// Default hub endpoint when `POLLCAST_HUB_ENDPOINT` is unset.
const DEFAULT_HUB_ENDPOINT: &str = "https://hub.freefarcasterhub.com:3281/v1";

/// Default frame-builder endpoint when `POLLCAST_FRAMES_ENDPOINT` is unset.
const DEFAULT_FRAMES_ENDPOINT: &str = "https://dev.farcaster.vote";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = BotConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export POLLCAST_FID=<bot fid>");
        eprintln!("  export POLLCAST_SIGNER_SEED=<hex ed25519 seed>");
        std::process::exit(1);
    });

    let hub_endpoint = std::env::var("POLLCAST_HUB_ENDPOINT")
        .unwrap_or_else(|_| DEFAULT_HUB_ENDPOINT.to_string());
    let frames_endpoint = std::env::var("POLLCAST_FRAMES_ENDPOINT")
        .unwrap_or_else(|_| DEFAULT_FRAMES_ENDPOINT.to_string());
    let hub_auth = parse_auth_env()?;

    eprintln!("🗳️  Pollcast v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Fid: {}", config.fid);
    eprintln!("   Hub: {hub_endpoint}");
    eprintln!("   Frames: {frames_endpoint}");
    eprintln!("   Cooldown: {:?}\n", config.cooldown);

    let hub = Arc::new(HubClient::new(config.fid, hub_endpoint, hub_auth));

    let bot = Bot::new(config, hub.clone()).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
    bot.set_resolver(Arc::new(FrameResolver::new(frames_endpoint, hub)))
        .await;
    bot.start().await;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Received shutdown signal");
    bot.stop().await;

    Ok(())
}

/// Parse `POLLCAST_HUB_AUTH_HEADERS` / `POLLCAST_HUB_AUTH_KEYS` — two
/// comma-separated lists that must pair up.
fn parse_auth_env() -> Result<HashMap<String, String>, Box<dyn std::error::Error>> {
    let headers = std::env::var("POLLCAST_HUB_AUTH_HEADERS").unwrap_or_default();
    let keys = std::env::var("POLLCAST_HUB_AUTH_KEYS").unwrap_or_default();
    if headers.is_empty() && keys.is_empty() {
        return Ok(HashMap::new());
    }
    if headers.is_empty() != keys.is_empty() {
        return Err("POLLCAST_HUB_AUTH_HEADERS and POLLCAST_HUB_AUTH_KEYS must be set together".into());
    }
    let headers: Vec<&str> = headers.split(',').collect();
    let keys: Vec<&str> = keys.split(',').collect();
    if headers.len() != keys.len() {
        return Err("POLLCAST_HUB_AUTH_HEADERS and POLLCAST_HUB_AUTH_KEYS must have the same length".into());
    }
    Ok(headers
        .into_iter()
        .zip(keys)
        .map(|(h, k)| (h.trim().to_string(), k.trim().to_string()))
        .collect())
}
