use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::cli::context::CliContext;
use crate::cli::output::print_structured;
use crate::document::{load_document, ElementSummary};

#[derive(Args, Clone, Debug)]
pub struct InspectArgs {
    /// Document snapshot (JSON)
    pub document: PathBuf,
}

pub async fn cmd_inspect(args: InspectArgs, ctx: &CliContext) -> Result<()> {
    let document = load_document(&args.document).await?;
    let engine = ctx.config().engine();
    let elements = ElementSummary::collect(&document, &engine, document.elements());

    if print_structured(ctx.output(), &elements)? {
        return Ok(());
    }
    println!("{} elements in {}", elements.len(), args.document.display());
    for element in &elements {
        println!("{}", element.human_line());
    }
    Ok(())
}
