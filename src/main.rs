mod api;
mod auth;
mod campaign;
mod dispatch;
mod roster;
mod spreadsheet;

use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use wagon_core::config;
use wagon_core::traits::WhatsAppTransport;
use wagon_core::types::SessionState;
use wagon_store::Store;
use wagon_whatsapp::{generate_qr_terminal, WhatsAppSession};

#[derive(Parser)]
#[command(
    name = "wagon",
    version,
    about = "Wagon — WhatsApp group marketing & CRM backend"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server, WhatsApp session, and campaign scheduler.
    Serve,
    /// Link a WhatsApp account by scanning a QR code in the terminal.
    Pair,
    /// Check configuration and store health.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Serve => serve(&cli.config).await,
        Commands::Pair => pair(&cli.config).await,
        Commands::Status => status(&cli.config).await,
    }
}

async fn serve(config_path: &str) -> anyhow::Result<()> {
    let cfg = config::load(config_path)?;
    if cfg.auth.jwt_secret.is_empty() {
        anyhow::bail!(
            "auth.jwt_secret is empty. Set it in {config_path} before serving the API."
        );
    }

    let store = Store::new(&cfg.store).await?;
    let session = Arc::new(WhatsAppSession::new(
        cfg.whatsapp.clone(),
        &cfg.wagon.data_dir,
    ));

    if cfg.whatsapp.enabled {
        let mut inbound = session.start().await?;
        let inbound_store = store.clone();
        tokio::spawn(async move {
            while let Some(msg) = inbound.recv().await {
                if let Err(e) = inbound_store
                    .record_inbound(&msg.message_id, &msg.sender_jid, &msg.text)
                    .await
                {
                    tracing::warn!("failed to record inbound message: {e}");
                }
            }
        });
    } else {
        tracing::warn!("WhatsApp is disabled; sends will fail until it is enabled");
    }

    let transport: Arc<dyn WhatsAppTransport> = session;
    tokio::spawn(campaign::scheduler_loop(
        store.clone(),
        transport.clone(),
        cfg.whatsapp.default_country_code.clone(),
        cfg.campaign.poll_secs,
    ));

    api::serve(&cfg, store, transport).await?;
    Ok(())
}

async fn pair(config_path: &str) -> anyhow::Result<()> {
    let cfg = config::load(config_path)?;
    let session = WhatsAppSession::new(cfg.whatsapp.clone(), &cfg.wagon.data_dir);
    let _inbound = session.start().await?;

    println!("Waiting for a QR code. Scan it with WhatsApp > Linked Devices.");
    let mut shown: Option<String> = None;
    loop {
        tokio::time::sleep(Duration::from_secs(1)).await;

        if let Some(qr) = session.qr_data().await {
            if shown.as_deref() != Some(qr.as_str()) {
                println!("{}", generate_qr_terminal(&qr)?);
                shown = Some(qr);
            }
        }

        match session.status().await.state {
            SessionState::Connected => {
                println!("Paired. The account is linked; `wagon serve` can now send.");
                return Ok(());
            }
            SessionState::Timeout => {
                anyhow::bail!("pairing timed out, run `wagon pair` again");
            }
            SessionState::Conflict => {
                anyhow::bail!("session was taken over elsewhere, try again");
            }
            _ => {}
        }
    }
}

async fn status(config_path: &str) -> anyhow::Result<()> {
    let cfg = config::load(config_path)?;
    println!("Wagon status");
    println!("  server:    {}:{}", cfg.server.host, cfg.server.port);
    println!("  database:  {}", cfg.store.db_path);
    println!(
        "  whatsapp:  {} (device '{}', country code {})",
        if cfg.whatsapp.enabled { "enabled" } else { "disabled" },
        cfg.whatsapp.device_name,
        cfg.whatsapp.default_country_code
    );
    println!("  scheduler: every {}s", cfg.campaign.poll_secs);

    match Store::new(&cfg.store).await {
        Ok(store) => {
            let (groups,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM groups")
                .fetch_one(store.pool())
                .await?;
            let (subscribers,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM subscribers")
                .fetch_one(store.pool())
                .await?;
            let (campaigns,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM campaigns")
                .fetch_one(store.pool())
                .await?;
            println!("  store:     ok ({groups} groups, {subscribers} subscribers, {campaigns} campaigns)");
        }
        Err(e) => println!("  store:     FAILED ({e})"),
    }

    if cfg.auth.jwt_secret.is_empty() {
        println!("  auth:      jwt_secret NOT SET, `wagon serve` will refuse to start");
    } else {
        println!("  auth:      ok");
    }
    Ok(())
}
