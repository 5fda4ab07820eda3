//! CLI command implementations.

pub mod config;
pub mod history;
pub mod search;
pub mod suggest;
pub mod url;

use anyhow::{bail, Context as _, Result};
use beefline_search::{SearchQuery, SortDirection, SortField};
use clap::{Args, Subcommand};

/// Filter, sort and paging flags shared by `search` and `url encode`.
#[derive(Args, Debug, Clone, Default)]
pub struct QueryFlags {
    /// Breeds to include (comma-separated or repeated).
    #[arg(long, value_delimiter = ',')]
    pub breed: Vec<String>,

    /// Region to search in.
    #[arg(long)]
    pub region: Option<String>,

    /// Minimum price.
    #[arg(long)]
    pub min_price: Option<u64>,

    /// Maximum price.
    #[arg(long)]
    pub max_price: Option<u64>,

    /// Minimum age in months.
    #[arg(long)]
    pub min_age: Option<u64>,

    /// Maximum age in months.
    #[arg(long)]
    pub max_age: Option<u64>,

    /// Minimum weight in kg.
    #[arg(long)]
    pub min_weight: Option<u64>,

    /// Maximum weight in kg.
    #[arg(long)]
    pub max_weight: Option<u64>,

    /// Vaccination status (true or false).
    #[arg(long)]
    pub vaccinated: Option<bool>,

    /// Sort field: createdAt, price, age or weight.
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort order: asc or desc.
    #[arg(long)]
    pub order: Option<String>,

    /// Page number (starting at 1).
    #[arg(long)]
    pub page: Option<u32>,
}

impl QueryFlags {
    /// Override the parts of `query` given on the command line.
    pub fn apply(&self, mut query: SearchQuery) -> Result<SearchQuery> {
        let breeds: Vec<String> = self
            .breed
            .iter()
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .collect();
        if !breeds.is_empty() {
            query.filters.breed = Some(breeds);
        }
        if let Some(region) = &self.region {
            query.filters.region = Some(region.clone()).filter(|r| !r.is_empty());
        }

        let filters = &mut query.filters;
        filters.min_price = self.min_price.or(filters.min_price);
        filters.max_price = self.max_price.or(filters.max_price);
        filters.min_age = self.min_age.or(filters.min_age);
        filters.max_age = self.max_age.or(filters.max_age);
        filters.min_weight = self.min_weight.or(filters.min_weight);
        filters.max_weight = self.max_weight.or(filters.max_weight);
        filters.vaccination_status = self.vaccinated.or(filters.vaccination_status);

        if let Some(sort) = &self.sort {
            query.sort.field = SortField::parse(sort).with_context(|| {
                format!("Unknown sort field '{}' (expected createdAt, price, age or weight)", sort)
            })?;
        }
        if let Some(order) = &self.order {
            query.sort.direction = SortDirection::parse(order)
                .with_context(|| format!("Unknown sort order '{}' (expected asc or desc)", order))?;
        }
        if let Some(page) = self.page {
            if page == 0 {
                bail!("Page numbers start at 1");
            }
            query.page.current_page = page;
        }

        Ok(query)
    }
}

/// The query part of a URL or query string.
pub fn query_part(input: &str) -> &str {
    match input.split_once('?') {
        Some((_, query)) => query.split('#').next().unwrap_or(query),
        None => input,
    }
}

/// Arguments for the search command.
#[derive(Args)]
pub struct SearchArgs {
    /// Free-text search term.
    pub text: Option<String>,

    /// Start from a shared search URL or query string.
    #[arg(short, long)]
    pub url: Option<String>,

    #[command(flatten)]
    pub query: QueryFlags,

    /// Listings per page (default: from config).
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Read search terms from stdin and re-run the search as they settle.
    #[arg(short, long)]
    pub interactive: bool,

    /// Do not record the search in history.
    #[arg(long)]
    pub no_history: bool,
}

/// Arguments for the url command.
#[derive(Args)]
pub struct UrlArgs {
    #[command(subcommand)]
    pub command: UrlCommand,
}

#[derive(Subcommand)]
pub enum UrlCommand {
    /// Build a shareable query string from flags.
    Encode {
        /// Free-text search term.
        text: Option<String>,

        #[command(flatten)]
        query: QueryFlags,
    },
    /// Show the search state a URL or query string describes.
    Decode {
        /// URL or query string, e.g. `?breed=Zebu&page=2`.
        input: String,
    },
}

/// Arguments for the suggest command.
#[derive(Args)]
pub struct SuggestArgs {
    /// Search box input (empty shows recent and popular searches).
    #[arg(default_value = "")]
    pub input: String,
}

/// Arguments for the history command.
#[derive(Args)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub command: Option<HistoryCommand>,
}

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// List recent searches.
    List,
    /// Forget all recent searches.
    Clear {
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Set a config value.
    Set {
        /// Config key (dot-separated).
        key: String,
        /// Value to set.
        value: String,
    },
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
}
