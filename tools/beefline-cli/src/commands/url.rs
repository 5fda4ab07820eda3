//! Shareable URL commands.

use anyhow::Result;
use beefline_search::codec::{self, QueryParams};
use beefline_search::{FilterSet, SearchDefaults, SearchQuery};
use serde::Serialize;

use super::{query_part, QueryFlags, UrlArgs, UrlCommand};
use crate::context::Context;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Encoded {
    query_string: String,
    params: Vec<(String, String)>,
}

/// Run the url command.
pub async fn run(args: UrlArgs, ctx: &Context) -> Result<()> {
    match args.command {
        UrlCommand::Encode { text, query } => encode(text, &query, ctx),
        UrlCommand::Decode { input } => decode(&input, ctx),
    }
}

fn encode(text: Option<String>, flags: &QueryFlags, ctx: &Context) -> Result<()> {
    let mut query = SearchQuery::new(ctx.config.search.page_size);
    if let Some(text) = text {
        query.text = text;
    }
    let query = flags.apply(query)?;
    let params = codec::encode(&query);

    if ctx.output.is_json() {
        ctx.output.json(&Encoded {
            query_string: params.to_string(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
    } else {
        println!("{}", params);
    }
    Ok(())
}

fn decode(input: &str, ctx: &Context) -> Result<()> {
    let params = QueryParams::parse(query_part(input));
    let query = codec::decode(&params, ctx.config.search.page_size, &SearchDefaults::default());

    if ctx.output.is_json() {
        ctx.output.json(&query);
        return Ok(());
    }

    ctx.output.header("Search state");
    let filters = &query.filters;
    let text = if query.text.is_empty() { "-" } else { query.text.as_str() };
    ctx.output.kv("text", text);
    ctx.output.kv(
        "breed",
        &filters
            .breed
            .as_ref()
            .map(|b| b.join(", "))
            .unwrap_or_else(|| "-".to_string()),
    );
    ctx.output.kv("region", filters.region.as_deref().unwrap_or("-"));

    let ranges = [
        ("price", filters.min_price, filters.max_price),
        ("age", filters.min_age, filters.max_age),
        ("weight", filters.min_weight, filters.max_weight),
    ];
    for (name, min, max) in ranges {
        ctx.output.kv(name, &format_range(min, max));
    }

    let vaccinated = match filters.vaccination_status {
        Some(true) => "vaccinated only",
        Some(false) => "unvaccinated only",
        None => "any",
    };
    ctx.output.kv("vaccination", vaccinated);
    ctx.output.kv("filters", &filter_summary(filters));
    ctx.output.kv(
        "sort",
        &format!("{} {}", query.sort.field.as_str(), query.sort.direction.as_str()),
    );
    ctx.output.kv("page", &query.page.current_page.to_string());
    ctx.output.kv("canonical", &codec::encode(&query).to_string());
    Ok(())
}

fn filter_summary(filters: &FilterSet) -> String {
    match filters.active_count() {
        0 => "none".to_string(),
        n => format!("{} active", n),
    }
}

fn format_range(min: Option<u64>, max: Option<u64>) -> String {
    match (min, max) {
        (None, None) => "-".to_string(),
        (Some(min), None) => format!(">= {}", min),
        (None, Some(max)) => format!("<= {}", max),
        (Some(min), Some(max)) => format!("{} to {}", min, max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_range() {
        assert_eq!(format_range(None, None), "-");
        assert_eq!(format_range(Some(100), None), ">= 100");
        assert_eq!(format_range(None, Some(400)), "<= 400");
        assert_eq!(format_range(Some(1), Some(2)), "1 to 2");
    }

    #[test]
    fn test_filter_summary_counts_decoded_filters() {
        let params = QueryParams::parse("breed=Zebu,Sanga&minPrice=1000&maxPrice=5000&sort=price");
        let query = codec::decode(&params, 12, &SearchDefaults::default());
        assert_eq!(filter_summary(&query.filters), "3 active");
        assert_eq!(filter_summary(&FilterSet::new()), "none");
    }
}
