//! Listing search command.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use beefline_data::CattleListings;
use beefline_search::codec::{self, QueryParams};
use beefline_search::debounce::Debouncer;
use beefline_search::location::{LocationStore, MemoryLocation};
use beefline_search::{
    ControllerOptions, FetchStatus, ListingQueryService, SearchController, SearchDefaults,
    SearchView, SortSpec,
};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{query_part, SearchArgs};
use crate::context::Context;
use crate::output::{format_age, format_price, vaccination_badge};

type Controller = SearchController<CattleListings, MemoryLocation>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchOutput<'a> {
    share_url: String,
    #[serde(flatten)]
    view: &'a SearchView,
}

/// Run the search command.
pub async fn run(args: SearchArgs, ctx: &Context) -> Result<()> {
    let page_size = args.page_size.unwrap_or(ctx.config.search.page_size).max(1);

    let params = QueryParams::parse(args.url.as_deref().map(query_part).unwrap_or(""));
    let mut query = codec::decode(&params, page_size, &SearchDefaults::default());
    if let Some(text) = &args.text {
        query.text = text.clone();
    }
    let query = args.query.apply(query)?;
    ctx.output.debug(&format!("Search state: {}", codec::encode(&query)));

    let location = Arc::new(MemoryLocation::with_params(codec::encode(&query)));
    let service = Arc::new(ctx.listings()?);
    let options = ControllerOptions::new(page_size);

    if args.interactive {
        let controller = Arc::new(SearchController::new(service, location, options));
        return interactive(controller, &args, ctx).await;
    }

    let spinner = ctx.output.spinner("Searching listings...");
    let (controller, initial) = SearchController::mount(service, location, options);
    let status = initial.settled().await;
    spinner.finish_and_clear();

    let view = controller.view();
    if status == FetchStatus::Failed {
        bail!("{}", view.error.as_deref().unwrap_or(beefline_search::SEARCH_ERROR_MESSAGE));
    }

    if !args.no_history {
        record_history(&view.query.text, ctx);
    }

    print_view(&view, &controller.share_query_string(), ctx);
    Ok(())
}

fn record_history(text: &str, ctx: &Context) {
    if text.trim().is_empty() {
        return;
    }
    if let Err(e) = ctx.history().record(text) {
        ctx.output.warn(&format!("Could not save search history: {}", e));
    }
}

fn print_view(view: &SearchView, share_url: &str, ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(&SearchOutput {
            share_url: share_url.to_string(),
            view,
        });
        return;
    }

    let page = &view.query.page;
    ctx.output.header(&format!("{} listings found", page.total_count));

    if view.results.is_empty() {
        ctx.output.info("No cattle match these filters.");
    } else {
        let widths = [10, 24, 8, 10, 12, 18, 12];
        ctx.output.table_row(
            &["ID", "BREED", "AGE", "WEIGHT", "PRICE", "REGION", "STATUS"],
            &widths,
        );
        for listing in &view.results {
            let weight = format!("{:.0} kg", listing.weight);
            let price = format_price(listing.price);
            let age = format_age(listing.age);
            let badge = vaccination_badge(listing.vaccination_status);
            ctx.output.table_row(
                &[
                    listing.id.as_str(),
                    listing.breed.as_str(),
                    age.as_str(),
                    weight.as_str(),
                    price.as_str(),
                    listing.region.as_str(),
                    badge.as_str(),
                ],
                &widths,
            );
        }
    }

    ctx.output.info("");
    if page.total_pages > 0 {
        ctx.output.kv(
            "Page",
            &format!(
                "{} of {} (showing {}-{})",
                page.current_page,
                page.total_pages,
                page.start_item(),
                page.end_item()
            ),
        );
        let numbers: Vec<String> = page
            .page_numbers(5)
            .iter()
            .map(|n| {
                if *n == page.current_page {
                    format!("[{}]", n)
                } else {
                    n.to_string()
                }
            })
            .collect();
        ctx.output.kv("Pages", &numbers.join(" "));
    }
    let sort = view.query.sort;
    ctx.output.kv(
        "Sort",
        &format!("{} ({})", sort.field.display_name(), sort.direction.as_str()),
    );
    if !share_url.is_empty() {
        ctx.output.kv("Share", share_url);
    }
}

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Quit,
    Reset,
    Next,
    Prev,
    ToggleOrder,
    Page(u32),
    BadPage,
    Term(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        match line {
            ":quit" | ":q" => Self::Quit,
            ":reset" => Self::Reset,
            ":next" => Self::Next,
            ":prev" => Self::Prev,
            ":order" => Self::ToggleOrder,
            other if other.starts_with(":page") => {
                match other.trim_start_matches(":page").trim().parse::<u32>() {
                    Ok(page) if page >= 1 => Self::Page(page),
                    _ => Self::BadPage,
                }
            }
            text => Self::Term(text.to_string()),
        }
    }
}

/// Apply a navigation command.
///
/// A term still waiting in the debouncer is applied first, so the page it
/// resets to is not applied after the navigation.
async fn navigate<S, L>(
    controller: &SearchController<S, L>,
    debouncer: &Debouncer<String>,
    command: &Command,
) where
    S: ListingQueryService + 'static,
    L: LocationStore,
{
    debouncer.flush().await;
    match command {
        Command::Reset => {
            let _ = controller.reset_filters();
        }
        Command::Next => {
            let page = controller.query().page;
            if page.has_next() {
                let _ = controller.go_to_page(page.current_page + 1);
            }
        }
        Command::Prev => {
            let page = controller.query().page;
            if page.has_prev() {
                let _ = controller.go_to_page(page.current_page - 1);
            }
        }
        Command::ToggleOrder => {
            let sort = controller.query().sort;
            let _ = controller.set_sort(SortSpec::new(sort.field, sort.direction.toggled()));
        }
        Command::Page(page) => {
            let _ = controller.go_to_page(*page);
        }
        Command::Quit | Command::BadPage | Command::Term(_) => {}
    }
}

/// Interactive session: each stdin line is a search term, debounced before
/// it reaches the controller. `:page N`, `:next`, `:prev`, `:order` and
/// `:reset` navigate without retyping.
async fn interactive(controller: Arc<Controller>, args: &SearchArgs, ctx: &Context) -> Result<()> {
    ctx.output.info("Type a search term and press enter. :page N, :next, :prev, :order, :reset, :quit");

    let mut updates = controller.subscribe();
    let printer = {
        let ctx_output = ctx.output.clone();
        let json = ctx.output.is_json();
        tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let view = updates.borrow_and_update().clone();
                if view.loading {
                    continue;
                }
                if let Some(error) = &view.error {
                    ctx_output.error(error);
                    continue;
                }
                let share = codec::encode(&view.query).to_string();
                if json {
                    ctx_output.json(&SearchOutput { share_url: share, view: &view });
                } else {
                    ctx_output.success(&format!(
                        "{} listings, page {} of {}",
                        view.query.page.total_count,
                        view.query.page.current_page,
                        view.query.page.total_pages
                    ));
                    for listing in &view.results {
                        ctx_output.list_item(&format!(
                            "{} {} ({}, {})",
                            listing.breed,
                            format_price(listing.price),
                            listing.region,
                            format_age(listing.age)
                        ));
                    }
                }
            }
        })
    };

    let _ = controller.refetch();

    let debouncer = {
        let controller = Arc::clone(&controller);
        Debouncer::new(
            Duration::from_millis(ctx.config.search.debounce_ms),
            move |text: String| {
                let _ = controller.set_query_text(text);
            },
        )
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Quit => break,
            Command::BadPage => ctx.output.warn("Usage: :page N (N >= 1)"),
            Command::Term(text) => {
                if !args.no_history {
                    record_history(&text, ctx);
                }
                debouncer.push(text);
            }
            command => navigate(controller.as_ref(), &debouncer, &command).await,
        }
    }

    // The printer ends once the controller and its in-flight fetches are gone.
    debouncer.close().await;
    drop(controller);
    if let Err(e) = printer.await {
        tracing::warn!(error = %e, "result printer failed");
    }
    Ok(())
}
