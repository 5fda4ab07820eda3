//! Beefline CLI - search the Beefline cattle marketplace from a terminal.
//!
//! Commands:
//! - `beefline search` - Search listings by text, filters and sort order
//! - `beefline url` - Encode or decode shareable search URLs
//! - `beefline suggest` - Show search box suggestions
//! - `beefline history` - List or clear recent searches
//! - `beefline config` - Manage configuration

mod commands;
mod config;
mod context;
mod logging;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{ConfigArgs, HistoryArgs, SearchArgs, SuggestArgs, UrlArgs};
use logging::LogFormat;

/// Beefline CLI - Search cattle listings
#[derive(Parser)]
#[command(name = "beefline")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Log format written to stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Human)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search cattle listings
    Search(SearchArgs),

    /// Encode or decode shareable search URLs
    Url(UrlArgs),

    /// Show search suggestions for an input
    Suggest(SuggestArgs),

    /// Manage recent search history
    History(HistoryArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.log_format, cli.verbose);

    let output = output::Output::new(cli.verbose, cli.json);
    let ctx = context::Context::load(cli.config.as_deref(), output)?;

    let result = match cli.command {
        Commands::Search(args) => commands::search::run(args, &ctx).await,
        Commands::Url(args) => commands::url::run(args, &ctx).await,
        Commands::Suggest(args) => commands::suggest::run(args, &ctx).await,
        Commands::History(args) => commands::history::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
