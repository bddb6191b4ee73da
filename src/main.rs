//! ShopIt CLI - inventory stock tracking from the terminal

use clap::{Parser, Subcommand};
use shopit::config::{self, ShopitConfig};
use shopit::draft::StockDraft;
use shopit::ui;
use shopit::{Filter, StockGateway, StockService, StockStore, StockType};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Context, UpdateArgs};

#[derive(Parser)]
#[command(name = "shopit")]
#[command(version)]
#[command(about = "Inventory stock tracking - validated, resource-addressed data access over SQLite")]
#[command(long_about = r#"
ShopIt keeps a small inventory of stock items and exposes them as resources:
  • stockapp/stock       the whole collection
  • stockapp/stock/<id>  a single item

Example usage:
  shopit init
  shopit add --name Eyeliner --supplier Loreal --type 2 --quantity 10 --price 5
  shopit list --filter "quantity < ?" --arg 5
  shopit sell 1
  shopit serve --port 8080
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file (defaults to ./shopit.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides the config)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Emit machine-readable JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter shopit.toml
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,

        /// Authority used in resource identifiers
        #[arg(long)]
        authority: Option<String>,

        /// Refuse to add stock without an image
        #[arg(long)]
        require_image: bool,
    },

    /// Add a stock item
    Add {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        supplier: String,

        /// Type: 0/unknown, 1/type-one, 2/type-two
        #[arg(long = "type")]
        stock_type: Option<String>,

        #[arg(long, default_value = "", allow_hyphen_values = true)]
        quantity: String,

        #[arg(long, default_value = "", allow_hyphen_values = true)]
        price: String,

        /// Image reference
        #[arg(long)]
        image: Option<String>,
    },

    /// List stock at a resource (collection by default)
    List {
        /// Resource identifier or bare item id
        resource: Option<String>,

        /// Columns to show (repeatable)
        #[arg(long = "column")]
        columns: Vec<String>,

        /// SQL filter clause with `?` placeholders (collection only)
        #[arg(long)]
        filter: Option<String>,

        /// Filter argument (repeatable, bound in order)
        #[arg(long = "arg")]
        args: Vec<String>,

        /// Sort order, e.g. "name ASC"
        #[arg(long)]
        order: Option<String>,
    },

    /// Update fields of stock at a resource
    Update {
        /// Resource identifier or bare item id
        resource: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        supplier: Option<String>,

        #[arg(long = "type")]
        stock_type: Option<String>,

        #[arg(long, allow_hyphen_values = true)]
        quantity: Option<i64>,

        #[arg(long, allow_hyphen_values = true)]
        price: Option<i64>,

        #[arg(long)]
        image: Option<String>,

        #[arg(long)]
        filter: Option<String>,

        #[arg(long = "arg")]
        args: Vec<String>,
    },

    /// Delete stock at a resource
    Delete {
        /// Resource identifier or bare item id
        resource: String,

        #[arg(long)]
        filter: Option<String>,

        #[arg(long = "arg")]
        args: Vec<String>,
    },

    /// Sell one unit of an item
    Sell {
        /// Resource identifier or bare item id
        resource: String,
    },

    /// Insert a sample item
    Seed,

    /// Show inventory totals
    Stats,

    /// Start the HTTP server
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn is_human(self) -> bool {
        self == OutputMode::Human
    }
}

/// Print a `{ "ok": true, "command": .., "data": .. }` envelope
pub fn emit_success(mode: OutputMode, command: &str, data: serde_json::Value) -> anyhow::Result<()> {
    if mode.is_human() {
        return Ok(());
    }
    let envelope = serde_json::json!({
        "ok": true,
        "command": command,
        "data": data,
    });
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

fn filter_from(clause: Option<String>, args: &[String]) -> Option<Filter> {
    clause
        .filter(|c| !c.trim().is_empty())
        .map(|c| Filter::with_text_args(c, args))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let output = if cli.json { OutputMode::Json } else { OutputMode::Human };

    match &cli.command {
        Commands::Version => return commands::run_version(output),
        Commands::Init { force, authority, require_image } => {
            let path = cli.config.clone().unwrap_or_else(config::default_config_path);
            let settings = ShopitConfig {
                database: None,
                authority: authority.clone(),
                require_image: Some(*require_image),
                port: None,
            };
            config::write_config(&path, &settings, *force)?;

            let cwd = std::env::current_dir()?;
            let database = cli.database.clone().unwrap_or_else(|| settings.database_path(&cwd));
            config::ensure_db_dir(&database)?;
            StockStore::open(&database)?;

            if output.is_human() {
                ui::success(&format!("Wrote {}", path.display()));
                ui::info("Database", &database.display().to_string());
            } else {
                emit_success(output, "init", serde_json::json!({
                    "config": path.display().to_string(),
                    "database": database.display().to_string(),
                }))?;
            }
            return Ok(());
        }
        _ => {}
    }

    let settings = config::load_config(cli.config.as_deref())?.unwrap_or_default();
    let cwd = std::env::current_dir()?;
    let database = cli.database.clone().unwrap_or_else(|| settings.database_path(&cwd));
    config::ensure_db_dir(&database)?;

    tracing::debug!("Opening {} as {}", database.display(), settings.authority());
    let gateway = StockGateway::open(&database, settings.authority())?;
    let service = StockService::start(gateway)?;

    let ctx = Context { service, config: settings, output };
    commands::watch_changes(&ctx);

    match cli.command {
        Commands::Add { name, supplier, stock_type, quantity, price, image } => {
            let stock_type = stock_type.map(|t| t.parse::<StockType>()).transpose()?;
            let draft = StockDraft { name, supplier, quantity, price, stock_type, image };
            commands::run_add(&ctx, draft).await?;
        }

        Commands::List { resource, columns, filter, args, order } => {
            let filter = filter_from(filter, &args);
            commands::run_list(&ctx, resource.as_deref(), &columns, filter, order).await?;
        }

        Commands::Update { resource, name, supplier, stock_type, quantity, price, image, filter, args } => {
            let update = UpdateArgs { name, supplier, stock_type, quantity, price, image };
            commands::run_update(&ctx, &resource, update, filter_from(filter, &args)).await?;
        }

        Commands::Delete { resource, filter, args } => {
            commands::run_delete(&ctx, &resource, filter_from(filter, &args)).await?;
        }

        Commands::Sell { resource } => commands::run_sell(&ctx, &resource).await?,

        Commands::Seed => commands::run_seed(&ctx).await?,

        Commands::Stats => commands::run_stats(&ctx).await?,

        Commands::Serve { port } => {
            let port = port.unwrap_or_else(|| ctx.config.port());
            if output.is_human() {
                ui::info("Database", &database.display().to_string());
                ui::info("Serving", &ctx.service.gateway().collection_uri().to_uri_string());
            }
            shopit::server::start_server(port, ctx.service.clone()).await?;
        }

        // handled before the store is opened
        Commands::Init { .. } | Commands::Version => {}
    }

    Ok(())
}
