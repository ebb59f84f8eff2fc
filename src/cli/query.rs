use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use soulpick_dom::PathSelector;

use crate::cli::context::CliContext;
use crate::cli::output::print_structured;
use crate::document::{load_document, ElementSummary};

#[derive(Args, Clone, Debug)]
pub struct QueryArgs {
    /// Document snapshot (JSON)
    pub document: PathBuf,

    /// Path selector, e.g. "BODY UL.tasks LI.task"
    pub selector: String,
}

#[derive(Serialize)]
struct QueryOutput {
    selector: String,
    matches: Vec<ElementSummary>,
}

pub async fn cmd_query(args: QueryArgs, ctx: &CliContext) -> Result<()> {
    let selector: PathSelector = args
        .selector
        .parse()
        .with_context(|| format!("Invalid selector '{}'", args.selector))?;
    let document = load_document(&args.document).await?;
    let engine = ctx.config().engine();
    let output = QueryOutput {
        selector: selector.to_string(),
        matches: ElementSummary::collect(&document, &engine, document.query_all(&selector)),
    };

    if print_structured(ctx.output(), &output)? {
        return Ok(());
    }
    println!("{} match(es) for {}", output.matches.len(), output.selector);
    for element in &output.matches {
        println!("{}", element.human_line());
    }
    Ok(())
}
