use clap::Parser;
use rollhouse::api::handlers::AppState;
use rollhouse::api::ApiServer;
use rollhouse::catalog::default_catalog;
use rollhouse::config::RollhouseConfig;
use rollhouse::errors::{CasinoError, CasinoResult};
use rollhouse::games::OutcomeEngine;
use rollhouse::ledger::types::Role;
use rollhouse::ledger::{CasinoStore, Ledger};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "rollhouse", about = "Casino wagering service", version)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, short)]
    config: Option<String>,

    /// Override the listen host
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port
    #[arg(long)]
    port: Option<u16>,

    /// Override the database directory
    #[arg(long)]
    db_path: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rollhouse=info,tower_http=info".into()),
        )
        .init();

    if let Err(e) = run(Args::parse()).await {
        tracing::error!(error = %e, "startup failed");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> CasinoResult<()> {
    let mut config = match &args.config {
        Some(path) => RollhouseConfig::load(path)?,
        None => RollhouseConfig::default(),
    };
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(db_path) = args.db_path {
        config.storage.data_directory = db_path;
    }
    config.validate()?;

    let store = Arc::new(CasinoStore::open(&config.storage.data_directory)?);
    let seeded = store.seed_catalog(&default_catalog())?;
    if seeded > 0 {
        info!(seeded, "seeded game catalog");
    }

    if config.house.seed_demo_accounts {
        seed_demo_accounts(&store, config.house.starting_balance)?;
    }

    let engine = OutcomeEngine::new(config.house.policy.clone());
    if !matches!(config.house.policy, rollhouse::games::house::HousePolicy::Fair) {
        warn!(policy = ?config.house.policy, "house policy is not fair play");
    }

    let ledger = Ledger::new(store.clone(), engine, config.house.max_bet);
    let state = Arc::new(AppState {
        store,
        ledger,
        default_starting_balance: config.house.starting_balance,
    });

    info!(
        data_directory = %config.storage.data_directory,
        max_bet = %config.house.max_bet,
        "rollhouse starting"
    );
    ApiServer::new(config.server_config(), state).run().await
}

fn seed_demo_accounts(
    store: &CasinoStore,
    starting_balance: rollhouse::money::Money,
) -> CasinoResult<()> {
    for (id, role) in [("demo", Role::User), ("admin", Role::Admin)] {
        match store.create_account(id, role, starting_balance) {
            Ok(account) => info!(id = %account.id, balance = %account.balance, "seeded account"),
            Err(CasinoError::AccountExists(_)) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
