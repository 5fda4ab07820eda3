//! Search history commands.

use anyhow::Result;
use dialoguer::Confirm;

use super::{HistoryArgs, HistoryCommand};
use crate::context::Context;

/// Run the history command.
pub async fn run(args: HistoryArgs, ctx: &Context) -> Result<()> {
    match args.command.unwrap_or(HistoryCommand::List) {
        HistoryCommand::List => list(ctx),
        HistoryCommand::Clear { yes } => clear(yes, ctx),
    }
}

fn list(ctx: &Context) -> Result<()> {
    let entries = ctx.history().entries();

    if ctx.output.is_json() {
        ctx.output.json(&entries);
        return Ok(());
    }

    if entries.is_empty() {
        ctx.output.info("No recent searches");
        return Ok(());
    }

    ctx.output.header("Recent searches");
    for entry in &entries {
        let when = entry
            .timestamp
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
            .to_string();
        ctx.output
            .table_row(&[when.as_str(), entry.query.as_str()], &[16, 0]);
    }
    Ok(())
}

fn clear(yes: bool, ctx: &Context) -> Result<()> {
    let history = ctx.history();
    let count = history.entries().len();
    if count == 0 {
        ctx.output.info("No recent searches");
        return Ok(());
    }

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Forget {} recent search(es)?", count))
            .default(false)
            .interact()?;

        if !confirmed {
            ctx.output.warn("Cancelled");
            return Ok(());
        }
    }

    history.clear()?;
    ctx.output.success("Search history cleared");
    Ok(())
}
