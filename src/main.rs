//! wallet-host
//!
//! Line-delimited JSON-RPC host around [`WalletAdapter`]: one request per
//! stdin line, one response per stdout line. Stands in for the browser
//! extension transport during development and scripting.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wallet_adapter_core::adapter::WalletAdapter;
use wallet_adapter_core::authenticator::AutoApprove;
use wallet_adapter_core::config::WalletConfig;
use wallet_adapter_core::keystore::MemoryKeyStore;

#[derive(Parser)]
#[command(name = "wallet-host")]
#[command(about = "JSON-RPC wallet host - one request per stdin line")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Unlock window granted after a successful authentication, in seconds
    #[arg(long, default_value_t = 120)]
    session_ttl: u64,

    /// Re-authenticate on every request instead of once per unlock window
    #[arg(long)]
    auth_per_request: bool,

    /// Human-readable account label returned on connect
    #[arg(long)]
    label: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let config = WalletConfig {
        session_ttl: Duration::from_secs(cli.session_ttl),
        require_auth_per_request: cli.auth_per_request,
        account_label: cli.label,
    };

    let adapter = WalletAdapter::new(
        Arc::new(MemoryKeyStore::new()),
        Arc::new(AutoApprove),
        config,
    );

    match adapter.public_key() {
        Ok(key) => info!(public_key = %key.to_base58(), "wallet ready"),
        Err(err) => error!(error = %err, "key initialization failed"),
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = adapter.handle_raw(&line).await;
        let encoded = serde_json::to_string(&response)
            .unwrap_or_else(|e| format!(r#"{{"jsonrpc":"2.0","id":0,"error":{{"code":-32603,"message":"Internal error","data":"{e}"}}}}"#));
        stdout.write_all(encoded.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    info!("stdin closed, shutting down");
    Ok(())
}
