//! commitscan CLI - find an author's commits across Azure DevOps projects.

mod commands;
#[cfg(feature = "devops")]
mod config;
#[cfg(feature = "devops")]
mod progress;
#[cfg(feature = "devops")]
mod shutdown;

use clap::{Parser, Subcommand};
use console::Term;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "commitscan")]
#[command(version)]
#[command(about = "Find every commit an author made across Azure DevOps projects")]
#[command(
    long_about = "commitscan walks every repository of the given Azure DevOps projects, \
collects the commits of one author on each default branch, and summarizes them \
per repository and per month. Projects or repositories that fail are reported \
without stopping the search."
)]
#[command(after_long_help = r#"EXAMPLES
    Search two projects for one author:
        $ commitscan search -o contoso -p shop -p infra -a jane@contoso.com

    Limit to a date range and export JSON:
        $ commitscan search -p shop -a jane --from 2024-01-01 --to 2024-06-30 --format json

    Show only commits mentioning "login":
        $ commitscan search -p shop -a jane --filter login

    Generate shell completions:
        $ commitscan completions bash > ~/.local/share/bash-completion/completions/commitscan

CONFIGURATION
    commitscan reads configuration from:
      1. ~/.config/commitscan/config.toml (or $XDG_CONFIG_HOME/commitscan/config.toml)
      2. ./commitscan.toml
      3. Environment variables (COMMITSCAN_ prefix, sections joined by "__")
      4. .env file in current directory

ENVIRONMENT VARIABLES
    COMMITSCAN_DEVOPS__TOKEN           Personal access token (Code: Read)
    COMMITSCAN_DEVOPS__ORGANIZATION    Default organization
    COMMITSCAN_DEVOPS__HOST            Service URL (default: https://dev.azure.com)
    COMMITSCAN_SEARCH__PAGE_SIZE       Commits per request (default: 1000)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search projects for the commits of one author
    #[cfg(feature = "devops")]
    Search(commands::search::SearchArgs),
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing for non-TTY mode (structured logging)
    // Only initialize if not connected to a TTY
    if !Term::stdout().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("commitscan=info,commitscan_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Completions { shell } => {
            commands::meta::handle_completions(shell)?;
        }
        #[cfg(feature = "devops")]
        Commands::Search(args) => {
            // Load configuration (config file -> env vars -> defaults)
            let config = config::Config::load();
            // First Ctrl+C stops the search and keeps partial results
            let cancel = shutdown::setup_shutdown_handler();
            commands::search::handle_search(args, &config, cancel).await?;
        }
    }

    Ok(())
}
