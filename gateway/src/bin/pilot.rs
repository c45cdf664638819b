//! Command-line demo: run one GitHub capability and print the result.

use anyhow::Context;
use clap::{Parser, Subcommand};
use pilot_core::{Orchestrator, Settings};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pilot", about = "Let the model pick and run a GitHub action")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Star a repository (owner/name)
    Star {
        #[arg(default_value = "aipotheosis-labs/aci")]
        repository: String,
    },
    /// Fetch and decode a file from a repository
    File {
        #[arg(default_value = "aipotheosis-labs/aci")]
        repository: String,
        #[arg(default_value = "README.md")]
        path: String,
    },
    /// List repositories of the linked account
    Repos,
    /// Analyze the dependencies declared in a repository's package.json
    Deps {
        repository: String,
        #[arg(default_value = "package.json")]
        path: String,
    },
    /// Create an issue
    Issue {
        repository: String,
        title: String,
        description: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env().context("failed to load settings")?;
    let orchestrator = Orchestrator::from_settings(&settings);

    let output = match cli.command {
        Command::Star { repository } => orchestrator.star_repository(&repository).await?,
        Command::File { repository, path } => {
            orchestrator.get_file_content(&repository, &path).await?
        }
        Command::Repos => orchestrator.list_repositories().await?,
        Command::Deps { repository, path } => {
            serde_json::to_value(orchestrator.analyze_dependencies(&repository, &path).await?)?
        }
        Command::Issue {
            repository,
            title,
            description,
        } => serde_json::to_value(
            orchestrator
                .create_issue(&repository, &title, &description)
                .await?,
        )?,
    };

    info!("Done");
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
