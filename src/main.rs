use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use abc_pizza_mcp::{
    build_registry,
    config::{self, AppConfig, LogFormat},
    logging,
    mcp::{self, McpInterface},
    storage::{applied_migrations, Database},
};

/// ABC Pizza MCP server
#[derive(Parser, Debug)]
#[command(name = "abc-pizza-mcp", version, about)]
struct Args {
    /// Database connection string (overrides DATABASE_URL)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Log output format (overrides LOG_FORMAT)
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Serve MCP over stdio (default)
    Serve {
        /// Load the demo catalog before serving
        #[arg(long)]
        seed: bool,
    },
    /// Apply pending schema migrations and exit
    Migrate,
    /// Load the demo catalog and sample users, then exit
    Seed,
    /// Print the registered tools as JSON and exit
    Tools,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let mut config = AppConfig::from_env().context("invalid configuration")?;

    if let Some(url) = args.database_url {
        config.database.url = url;
    } else if std::env::var_os("DATABASE_URL").is_none() {
        config::init_data_dir().context("failed to create data directory")?;
    }
    if let Some(format) = args.log_format {
        config.log_format = format;
    }

    logging::init(config.log_format);

    let command = args.command.unwrap_or(Command::Serve { seed: false });
    let db = Database::open(&config.database)
        .await
        .with_context(|| format!("failed to open database at {}", config.database.url))?;

    let outcome = run(command, &config, &db).await;
    db.close().await;
    outcome
}

async fn run(command: Command, config: &AppConfig, db: &Database) -> anyhow::Result<()> {
    match command {
        Command::Serve { seed } => {
            if seed {
                db.seed().await.context("failed to seed database")?;
            }

            let registry = Arc::new(build_registry(db));
            let interface = McpInterface::new(registry, config.server.name.clone());

            tracing::info!(
                name = %config.server.name,
                tools = interface.registry().list_tools().len(),
                "Serving MCP over stdio"
            );

            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            mcp::serve(&interface, stdin, tokio::io::stdout()).await?;
        }
        Command::Migrate => {
            let applied = applied_migrations(db.pool()).await?;
            tracing::info!(migrations = ?applied, "Schema is up to date");
        }
        Command::Seed => {
            let summary = db.seed().await.context("failed to seed database")?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Tools => {
            let registry = build_registry(db);
            let tools = mcp::schema::methods_to_mcp_tools(registry.list_tools());
            let listing = serde_json::json!({
                "activations": registry.list_activations(),
                "tools": tools,
            });
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
    }

    Ok(())
}
