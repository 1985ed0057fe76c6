use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use chrono::NaiveDate;
use commitscan::devops::DevOpsClient;
use commitscan::platform::{Credential, HostingApi, RateLimitedApi};
use commitscan::search::{
    DateRange, SearchEvent, SearchOptions, SearchRequest, ValidationError, start_search,
};
use commitscan::views::DEFAULT_TOP_N;
use console::Term;

use crate::commands::render::{self, OutputFormat};
use crate::config::Config;
use crate::progress::ProgressReporter;

/// Options of `commitscan search`.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SearchArgs {
    /// Azure DevOps organization (default from config)
    #[arg(short, long)]
    pub organization: Option<String>,

    /// Project(s) to search - can specify multiple
    #[arg(short, long = "project", required = true)]
    pub projects: Vec<String>,

    /// Author to search for (name or email)
    #[arg(short, long)]
    pub author: String,

    /// Only commits on or after this day (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Only commits on or before this day (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Only show repositories and commits matching this text
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Number of repositories in the top list
    #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_N)]
    pub top: usize,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Commits requested per page (default from config or 1000)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Disable proactive rate limiting (may cause API throttling)
    #[arg(short = 'R', long)]
    pub no_rate_limit: bool,
}

fn validation_hint(error: ValidationError) -> String {
    match error {
        ValidationError::MissingOrganization => format!(
            "{error}: pass --organization or set [devops] organization in {}",
            config_location()
        ),
        ValidationError::MissingCredential => format!(
            "{error}: set COMMITSCAN_DEVOPS__TOKEN or [devops] token in {}",
            config_location()
        ),
        _ => error.to_string(),
    }
}

fn config_location() -> String {
    Config::default_config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "commitscan.toml".to_string())
}

fn build_request(args: &SearchArgs, config: &Config) -> SearchRequest {
    let organization = args
        .organization
        .clone()
        .or_else(|| config.devops.organization.clone())
        .unwrap_or_default();
    let token = config.token().unwrap_or_default();

    SearchRequest::new(
        organization,
        &args.projects,
        &args.author,
        Credential::new(token),
    )
    .with_date_range(DateRange::new(args.from, args.to))
}

fn build_options(args: &SearchArgs, config: &Config, cancel: Arc<AtomicBool>) -> SearchOptions {
    SearchOptions {
        page_size: args.page_size.unwrap_or(config.search.page_size),
        ..SearchOptions::default()
    }
    .with_cancel_flag(cancel)
}

fn warn_no_rate_limit(is_tty: bool) {
    if is_tty {
        eprintln!("Warning: Rate limiting disabled - you may experience API throttling\n");
    } else {
        tracing::warn!("Rate limiting disabled - you may experience API throttling");
    }
}

pub(crate) async fn handle_search(
    args: SearchArgs,
    config: &Config,
    cancel: Arc<AtomicBool>,
) -> Result<(), Box<dyn std::error::Error>> {
    let is_tty = Term::stdout().is_term();

    let request = build_request(&args, config);
    if let Err(e) = request.validate() {
        return Err(validation_hint(e).into());
    }
    let options = build_options(&args, config, cancel);

    let client = DevOpsClient::new(&config.devops.host)?;
    let api: Arc<dyn HostingApi> = if args.no_rate_limit || config.search.no_rate_limit {
        warn_no_rate_limit(is_tty);
        Arc::new(client)
    } else {
        Arc::new(RateLimitedApi::new(
            client,
            config.search.requests_per_second,
        ))
    };

    let mut updates = start_search(api, request, options)?;
    let reporter = ProgressReporter::new();
    let mut last = None;
    while let Some(update) = updates.recv().await {
        reporter.handle(&update);
        last = Some(update);
    }
    reporter.finish();

    let Some(last) = last else {
        return Err("search stopped before reporting any result".into());
    };
    if matches!(last.event, SearchEvent::Cancelled) && is_tty {
        eprintln!("Search cancelled, showing partial results\n");
    }

    let filter = args.filter.as_deref().unwrap_or_default();
    match args.format {
        OutputFormat::Table => {
            print!(
                "{}",
                render::render_tables(
                    last.snapshot.repos(),
                    filter,
                    args.top,
                    &config.devops.host
                )
            );
        }
        OutputFormat::Json => {
            println!("{}", render::render_json(last.snapshot.repos(), filter)?);
        }
    }

    Ok(())
}
