//! Repeats every public message back to its channel.
//!
//! ```text
//! cargo run --example parrot_bot -- irc.libera.chat 6697 "#TestParrotBot"
//! ```

use slirc_client::{ConnectConfig, Connection, EventKind, DEFAULT_PORT};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "irc.libera.chat".to_string());
    let port = match args.next() {
        Some(port) => port.parse()?,
        None => DEFAULT_PORT,
    };
    let channel = args.next().unwrap_or_else(|| "#TestParrotBot".to_string());

    let mut conn = Connection::new();
    conn.on(EventKind::Connect, |client, _| {
        client.set_nick("ParrotBot");
        client.send_user_registration("ParrotBot");
        Ok(())
    });
    conn.on(EventKind::Welcome, move |client, _| {
        client.join_channel(&channel);
        Ok(())
    });
    conn.on(EventKind::PublicMessage, |client, event| {
        if let Some(msg) = event.message() {
            client.send_message(&msg.channel, &msg.message);
        }
        Ok(())
    });

    let config = ConnectConfig::default().with_tls(port != DEFAULT_PORT);
    conn.connect(&host, port, &config).await?;

    let err = match conn.run_loop().await {
        Ok(never) => match never {},
        Err(e) => e,
    };
    warn!(error = %err, "parrot stopped");
    Ok(())
}
