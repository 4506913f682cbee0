//! faye-client - subscribe to Bayeux channels and log what arrives.
//!
//! Configured through `FAYE_CLIENT__*` environment variables (see
//! [`faye_client::config`]). Runs until Ctrl-C.

use std::sync::Arc;

use faye_client::adapters::{LoggingPlugin, WebSocketTransport};
use faye_client::application::FayeClient;
use faye_client::config::{AppConfig, LoggingConfig};
use faye_client::domain::message::Ext;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load_validated()?;
    init_tracing(&config.logging);

    let transport = Arc::new(
        WebSocketTransport::new(config.client.url.clone())
            .with_connect_timeout(config.client.connect_timeout()),
    );
    let mut builder = FayeClient::builder(transport)
        .options((&config.client).into())
        .plugin(LoggingPlugin::new());
    if let Some(signing) = &config.signing {
        builder = builder.plugin(signing.plugin());
    }
    let client = builder.build();

    let mut handles = Vec::new();
    for channel in config.client.channels_list() {
        let handle = client
            .subscribe(&channel, Ext::new(), |payload: &[u8]| {
                tracing::info!(payload = %String::from_utf8_lossy(payload), "Message received");
            })
            .await?;
        tracing::info!(channel = %handle.channel(), "Subscribed");
        handles.push(handle);
    }

    client.connect().await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");

    drop(handles);
    client.disconnect().await;
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = logging
        .env_filter()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if logging.json {
        let _ = tracing_subscriber::fmt()
            .json()
            .with_target(true)
            .with_env_filter(filter)
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_target(true)
            .with_env_filter(filter)
            .try_init();
    }
}
