//! Headless bancho client: log in, keep the session alive, log out on
//! Ctrl-C.
//!
//! Configuration comes from the environment:
//! - `CHO_SERVER`   base domain of the target server (default `ppy.sh`)
//! - `CHO_USERNAME` account name (required)
//! - `CHO_PASSWORD` account password, plaintext (required)
//! - `CHO_INSECURE` set to use plain http instead of https

use std::sync::Arc;
use std::time::Duration;

use cho_core::{ChoClient, ChoError, ClientVersion, HardwareId, ReqwestTransport, TargetServer};
use tracing::{error, info};

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

#[tokio::main]
async fn main() -> Result<(), ChoError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let server = env_var("CHO_SERVER").unwrap_or_else(|| "ppy.sh".to_owned());
    let https = env_var("CHO_INSECURE").is_none();
    let Some(username) = env_var("CHO_USERNAME") else {
        error!("CHO_USERNAME is not set");
        std::process::exit(2);
    };
    let Some(password) = env_var("CHO_PASSWORD") else {
        error!("CHO_PASSWORD is not set");
        std::process::exit(2);
    };

    let transport = Arc::new(ReqwestTransport::new()?);
    let client = ChoClient::new(transport)
        .with_server(TargetServer::from_base_url(&server, https))
        .with_version(ClientVersion::new(2022, 4, 24))
        .with_hardware(HardwareId::generate())
        .with_heartbeat_interval(Duration::from_secs(5));

    info!(server, username, "logging in");
    if !client.connect(&username, &password, false).await? {
        error!("login refused by server");
        std::process::exit(1);
    }
    info!(user_id = client.user_id().await, "logged in");

    let heartbeat = client.start_heartbeat().await?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("interrupt received, logging out");
            if let Err(error) = client.logout().await {
                error!(%error, "logout flush failed");
            }
        }
        _ = heartbeat => {
            error!("heartbeat loop stopped, session lost");
        }
    }

    Ok(())
}
