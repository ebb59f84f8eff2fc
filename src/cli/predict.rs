use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use pick_flow::{Toggle, WorkflowController};
use serde::Serialize;
use soulpick_dom::{Document, NodeId};
use tracing::warn;

use crate::cli::context::CliContext;
use crate::cli::output::print_structured;
use crate::document::{load_document, save_document, ElementSummary};

#[derive(Args, Clone, Debug)]
pub struct PredictArgs {
    /// Document snapshot (JSON)
    pub document: PathBuf,

    /// Element ids to select, as listed by `inspect`
    #[arg(short, long = "select", value_name = "ID", num_args = 1.., required = true)]
    pub select: Vec<NodeId>,

    /// Write the document with marker classes rendered
    #[arg(long, value_name = "FILE")]
    pub write: Option<PathBuf>,
}

#[derive(Serialize)]
pub struct SelectionOutput {
    pub selected: Vec<ElementSummary>,
    pub predicted: Vec<ElementSummary>,
}

/// Toggles each id in order. Ids that cannot be selected are logged and
/// skipped.
pub fn apply_selection(controller: &mut WorkflowController, document: &Document, ids: &[NodeId]) {
    for id in ids {
        if let Toggle::Ignored(reason) = controller.toggle_selection(document, *id) {
            warn!(node = %id, ?reason, "selection ignored");
        }
    }
}

pub fn selection_output(controller: &WorkflowController, document: &Document) -> SelectionOutput {
    let engine = controller.engine();
    SelectionOutput {
        selected: ElementSummary::collect(document, engine, controller.selected().iter()),
        predicted: ElementSummary::collect(document, engine, controller.predicted().iter()),
    }
}

pub fn print_selection_human(output: &SelectionOutput) {
    println!("Selected ({}):", output.selected.len());
    for element in &output.selected {
        println!("{}", element.human_line());
    }
    println!("Predicted ({}):", output.predicted.len());
    for element in &output.predicted {
        println!("{}", element.human_line());
    }
}

pub async fn cmd_predict(args: PredictArgs, ctx: &CliContext) -> Result<()> {
    let mut document = load_document(&args.document).await?;
    let (mut controller, _) = ctx.config().recording_controller(&document);
    apply_selection(&mut controller, &document, &args.select);
    if controller.selected_count() == 0 {
        bail!("none of the given ids could be selected");
    }

    let output = selection_output(&controller, &document);
    if let Some(path) = &args.write {
        controller
            .markers()
            .render(&mut document, &ctx.config().markers)?;
        save_document(&document, path).await?;
    }

    if print_structured(ctx.output(), &output)? {
        return Ok(());
    }
    print_selection_human(&output);
    if let Some(path) = &args.write {
        println!("Marked document written to {}", path.display());
    }
    Ok(())
}
