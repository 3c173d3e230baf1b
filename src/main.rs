use anyhow::{Context, Result};
use clap::Parser;

use creel::commands::{self, Command, State};
use creel::config::{self, Config};
use creel::storage::Database;

#[derive(Parser, Debug)]
#[command(name = "creel", about = "Multi-user RSS aggregator")]
struct Args {
    /// Command to run: login, register, reset, users, agg, addfeed, feeds,
    /// follow, following, unfollow, browse
    command: String,

    /// Command arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config_dir = config::config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
    }

    let config_path = config_dir.join("config.json");
    let config = Config::load(&config_path).context("Failed to read config file")?;

    // Startup failures here are the only fatal error class; everything
    // after dispatch is the handlers' problem.
    let db_url = if config.db_url.is_empty() {
        let default_path = config_dir.join("creel.db");
        default_path
            .to_str()
            .context("Invalid UTF-8 in database path")?
            .to_string()
    } else {
        config.db_url.clone()
    };
    let db = Database::open(&db_url)
        .await
        .context("Failed to open database")?;

    let mut state = State {
        db,
        http: reqwest::Client::new(),
        config,
        config_path,
    };

    let registry = commands::default_registry();
    registry
        .run(
            &mut state,
            Command {
                name: args.command,
                args: args.args,
            },
        )
        .await?;
    Ok(())
}
