//! ZilStream portfolio tracker - Entry Point

use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use zilstream_app::render::{alert_table, portfolio_table};
use zilstream_app::{AppConfig, Application};
use zilstream_core::{Address, Indicator, Metric, ProviderKind};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// ZilStream portfolio tracker
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via ZILSTREAM_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll, evaluate alerts and serve the dashboard until Ctrl-C (default)
    Run,
    /// Fetch once and print the selected wallet's portfolio
    Balances {
        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Connect a wallet and select it
    Connect {
        #[command(subcommand)]
        provider: ConnectCommand,
    },
    /// Forget the selected wallet
    Disconnect,
    /// Toggle the favorite flag of a token
    Favorite {
        /// Token address (bech32)
        token: Address,
    },
    /// Manage price alerts
    Alert {
        #[command(subcommand)]
        command: AlertCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConnectCommand {
    /// Injected ZilPay provider (the configured watch address)
    Zilpay,
    /// Zeeves session provider
    Zeeves,
    /// Avatar name lookup
    Avatar { name: String },
}

#[derive(Subcommand, Debug)]
enum AlertCommand {
    /// Add an alert: `alert add <token> above 0.05 --metric price`
    Add {
        /// Token address (bech32)
        token: Address,
        /// above | below
        indicator: Indicator,
        /// Threshold
        value: Decimal,
        /// price (USD) | price_zil
        #[arg(long, default_value = "price")]
        metric: Metric,
    },
    /// List alerts
    List,
    /// Remove an alert
    Remove { id: Uuid },
    /// Re-arm a triggered alert
    Reset { id: Uuid },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();
    let command = args.command.unwrap_or(Command::Run);

    // Determine config path: CLI arg > ZILSTREAM_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("ZILSTREAM_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let missing_default = config_path == DEFAULT_CONFIG_PATH && !Path::new(&config_path).exists();
    let config = if missing_default {
        AppConfig::default()
    } else {
        AppConfig::from_file(&config_path)?
    };

    // One-shot commands keep stdout for their output
    let filter = if matches!(command, Command::Run) {
        config.telemetry.log_filter.as_str()
    } else {
        "warn"
    };
    zilstream_telemetry::init_logging(filter)?;

    info!("Starting ZilStream v{}", env!("CARGO_PKG_VERSION"));
    if missing_default {
        warn!(config_path = %config_path, "Config file not found, using defaults");
    } else {
        info!(config_path = %config_path, "Configuration loaded");
    }

    let app = Application::new(config)?;

    match command {
        Command::Run => app.run().await?,
        Command::Balances { json } => {
            app.restore()?;
            app.refresh_once().await;
            let view = app.view();
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print!("{}", portfolio_table(&view));
            }
        }
        Command::Connect { provider } => {
            app.restore()?;
            let connection = match provider {
                ConnectCommand::Zilpay => app.connect(ProviderKind::ZilPay).await?,
                ConnectCommand::Zeeves => app.connect(ProviderKind::Zeeves).await?,
                ConnectCommand::Avatar { name } => app.connect_avatar(&name).await?,
            };
            println!(
                "Connected {} via {} on {}",
                connection.address, connection.kind, connection.network
            );
        }
        Command::Disconnect => {
            app.restore()?;
            let address = app.disconnect()?;
            println!("Disconnected {address}");
        }
        Command::Favorite { token } => {
            app.restore()?;
            app.refresh_once().await;
            let favorited = app.toggle_favorite(&token)?;
            let verb = if favorited { "Added" } else { "Removed" };
            println!("{verb} favorite {token}");
        }
        Command::Alert { command } => {
            app.restore()?;
            match command {
                AlertCommand::Add {
                    token,
                    indicator,
                    value,
                    metric,
                } => {
                    let alert = app.add_alert(token, metric, indicator, value);
                    println!("Added alert {} ({alert})", alert.id);
                }
                AlertCommand::List => {
                    let state = app.snapshot();
                    print!("{}", alert_table(&state.alert.alerts, &state.token));
                }
                AlertCommand::Remove { id } => {
                    app.remove_alert(id)?;
                    println!("Removed alert {id}");
                }
                AlertCommand::Reset { id } => {
                    app.reset_alert(id)?;
                    println!("Reset alert {id}");
                }
            }
        }
    }

    Ok(())
}
