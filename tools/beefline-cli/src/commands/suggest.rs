//! Search suggestion command.

use anyhow::Result;
use beefline_search::suggest::suggest;

use super::SuggestArgs;
use crate::context::Context;

/// Run the suggest command.
pub async fn run(args: SuggestArgs, ctx: &Context) -> Result<()> {
    let history = ctx.history().entries();
    let suggestions = suggest(&args.input, &history);

    if ctx.output.is_json() {
        ctx.output.json(&suggestions);
        return Ok(());
    }

    if suggestions.is_empty() {
        ctx.output.info(&format!("No suggestions for '{}'", args.input));
        return Ok(());
    }

    for suggestion in &suggestions {
        ctx.output
            .list_item(&format!("{} ({})", suggestion.text, suggestion.kind.as_str()));
    }
    Ok(())
}
