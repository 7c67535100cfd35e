//! `iam-cli`: manage IAM groups from the command line.
//!
//! Reads the bearer token from `HIIRETAIL_TOKEN`, optional settings from a
//! TOML file, and prints results as pretty JSON.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use iam_client::config::{load_config, validate_config};
use iam_client::lifecycle::cancel_on_ctrl_c;
use iam_client::observability::init_tracing;
use iam_client::{CallContext, ClientConfig, IamClient};

#[derive(Parser)]
#[command(name = "iam-cli")]
#[command(about = "Manage Hii Retail IAM groups", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API base URL, overrides the configuration file
    #[arg(short, long, env = "IAM_BASE_URL")]
    url: Option<String>,

    /// Bearer token
    #[arg(long, env = "HIIRETAIL_TOKEN", hide_env_values = true)]
    token: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a group
    Create {
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Show one group
    Get { id: String },
    /// Replace a group's name and description
    Update {
        id: String,
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Delete a group; an already-absent group is not an error
    Delete { id: String },
    /// List all groups
    List,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };
    if let Some(url) = cli.url {
        config.base_url = url;
    }
    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            eprintln!("configuration error: {}", error);
        }
        return Err(format!("{} configuration error(s)", errors.len()).into());
    }

    init_tracing(&config.logging.effective_filter());
    tracing::debug!(base_url = %config.base_url, "Configuration loaded");

    let client = IamClient::from_config(&config, &cli.token)?;
    let token = CancellationToken::new();
    let watcher = cancel_on_ctrl_c(token.clone());
    let ctx = CallContext::with_cancellation(token);

    let result = run(&client, &ctx, cli.command).await;
    watcher.abort();
    result
}

async fn run(
    client: &IamClient,
    ctx: &CallContext,
    command: Commands,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Create { name, description } => {
            print_json(&client.create_group(ctx, &name, &description).await?)?;
        }
        Commands::Get { id } => {
            print_json(&client.get_group(ctx, &id).await?)?;
        }
        Commands::Update {
            id,
            name,
            description,
        } => {
            print_json(&client.update_group(ctx, &id, &name, &description).await?)?;
        }
        Commands::Delete { id } => match client.delete_group(ctx, &id).await {
            Ok(()) => println!("Deleted group {}", id),
            Err(e) if e.is_not_found() => println!("Group {} already absent", id),
            Err(e) => return Err(e.into()),
        },
        Commands::List => {
            print_json(&client.list_groups(ctx).await?)?;
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
