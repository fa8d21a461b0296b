//! BETBOOK — Personal Sports-Betting Ledger
//!
//! Entry point. Loads configuration, initialises structured logging,
//! opens the SQLite mirror, registers the default profile, and serves
//! the ledger API until Ctrl+C.

use anyhow::Result;
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{info, warn};

use betbook::config::AppConfig;
use betbook::importer::gemini::GeminiSlipReader;
use betbook::importer::SlipReader;
use betbook::server;
use betbook::server::routes::ServerState;
use betbook::storage::Store;

const BANNER: &str = r#"
 ____  _____ _____ ____   ___   ___  _  __
| __ )| ____|_   _| __ ) / _ \ / _ \| |/ /
|  _ \|  _|   | | |  _ \| | | | | | | ' /
| |_) | |___  | | | |_) | |_| | |_| | . \
|____/|_____| |_| |____/ \___/ \___/|_|\_\

  Personal Sports-Betting Ledger
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Load configuration from TOML
    let cfg = AppConfig::load("config.toml")?;

    // Initialise structured logging
    init_logging();

    // Print startup banner
    println!("{BANNER}");
    info!(
        profile = %cfg.ledger.profile,
        currency = %cfg.ledger.currency,
        database = %cfg.storage.database_path,
        "BETBOOK starting up"
    );

    // -- Open the store ----------------------------------------------------

    let store = Store::open(&cfg.storage.database_path).await?;
    store
        .ensure_profile(&cfg.ledger.profile, &cfg.ledger.profile_name)
        .await?;

    let bets = store.bets(&cfg.ledger.profile).await?;
    info!(bets = bets.len(), "Ledger loaded");

    // -- Slip importer (optional) ------------------------------------------

    let slip_reader: Option<Box<dyn SlipReader>> = if cfg.importer.enabled {
        match AppConfig::resolve_env(&cfg.importer.api_key_env) {
            Ok(key) => {
                let reader =
                    GeminiSlipReader::new(SecretString::new(key), cfg.importer.model.clone())?;
                info!(model = reader.model_name(), "Slip importer ready");
                Some(Box::new(reader))
            }
            Err(e) => {
                warn!(error = %e, "Slip importer enabled but key missing; import disabled");
                None
            }
        }
    } else {
        None
    };

    // -- Serve until shutdown ----------------------------------------------

    if !cfg.server.enabled {
        info!("Server disabled in config; nothing to do.");
        return Ok(());
    }

    let state = Arc::new(ServerState { store, slip_reader });
    server::spawn_server(state, cfg.server.port)?;

    info!("Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. BETBOOK shut down cleanly.");

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("betbook=info"));

    let json_logging = std::env::var("BETBOOK_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
