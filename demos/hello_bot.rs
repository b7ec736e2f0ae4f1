//! Greets anyone who says hi.
//!
//! ```text
//! cargo run --example hello_bot -- irc.libera.chat "#HelloBotTest"
//! ```

use slirc_client::{ConnectConfig, Connection, Error, EventKind, DEFAULT_PORT};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const GREETINGS: [&str; 5] = ["Hello", "Hi", "Hello there", "Hi there", "Hey"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "irc.libera.chat".to_string());
    let channel = args.next().unwrap_or_else(|| "#HelloBotTest".to_string());

    let mut conn = Connection::new();
    conn.on(EventKind::Connect, |client, _| {
        client.set_nick("ghast");
        client.send_user_registration("HelloBot");
        Ok(())
    });
    conn.on(EventKind::Welcome, move |client, _| {
        client.join_channel(&channel);
        Ok(())
    });
    conn.on(EventKind::Message, |client, event| {
        let Some(msg) = event.message() else {
            return Ok(());
        };
        let text = msg.message.to_lowercase();
        if text.contains("hi") || text.contains("hello") {
            let greeting = GREETINGS[msg.message.len() % GREETINGS.len()];
            client.send_message(msg.reply_target(), &format!("{} {}!", greeting, msg.sender));
        }
        Ok(())
    });
    conn.on(EventKind::Packet, |_, event| {
        if let Some(packet) = event.packet() {
            info!(%packet, "received");
        }
        Ok(())
    });

    conn.connect(&host, DEFAULT_PORT, &ConnectConfig::default())
        .await?;
    match conn.run_loop().await {
        Ok(never) => match never {},
        Err(Error::ConnectionClosed) => {
            info!("server closed the connection");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "connection failed");
            Err(e.into())
        }
    }
}
