use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, ValueEnum};
use pick_flow::{ActionKind, RunReport, WorkflowStep};
use serde::Serialize;
use soulpick_dom::NodeId;
use tracing::info;

use crate::cli::context::CliContext;
use crate::cli::output::print_structured;
use crate::cli::predict::{apply_selection, print_selection_human, selection_output, SelectionOutput};
use crate::document::{load_document, save_document};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ActionArg {
    Click,
    Input,
}

impl From<ActionArg> for ActionKind {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::Click => ActionKind::Click,
            ActionArg::Input => ActionKind::Input,
        }
    }
}

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Document snapshot (JSON)
    pub document: PathBuf,

    /// Element ids to select, as listed by `inspect`
    #[arg(short, long = "select", value_name = "ID", num_args = 1..)]
    pub select: Vec<NodeId>,

    /// Action applied to selected and predicted elements
    #[arg(short, long, value_enum, default_value = "click")]
    pub action: ActionArg,

    /// Value written by the input action
    #[arg(long)]
    pub value: Option<String>,

    /// Write the resulting document
    #[arg(short, long, value_name = "FILE")]
    pub write: Option<PathBuf>,
}

#[derive(Serialize)]
struct RunOutput {
    #[serde(flatten)]
    selection: SelectionOutput,
    report: RunReport,
}

pub async fn cmd_run(args: RunArgs, ctx: &CliContext) -> Result<()> {
    let kind = ActionKind::from(args.action);
    let value = match (kind, args.value.as_deref()) {
        (ActionKind::Input, None) => bail!("--value is required for the input action"),
        (ActionKind::Input, Some(value)) => Some(value.to_string()),
        (ActionKind::Click, _) => None,
    };

    let mut document = load_document(&args.document).await?;
    let (mut controller, notices) = ctx.config().recording_controller(&document);
    apply_selection(&mut controller, &document, &args.select);

    let transition = controller.request_action_choice(kind);
    if transition.step() == WorkflowStep::ElementSelection {
        for notice in notices.messages() {
            eprintln!("{}", notice);
        }
        bail!("nothing selected; pass --select with at least one element id");
    }

    let selection = selection_output(&controller, &document);
    let report = match &value {
        Some(value) => controller.apply_value(&mut document, value),
        None => controller.run(&mut document),
    };
    let Some(report) = report else {
        bail!("workflow already completed");
    };
    info!(
        session = %report.session,
        targets = report.outcomes.len(),
        failed = report.failed(),
        "run complete"
    );

    if let Some(path) = &args.write {
        save_document(&document, path).await?;
    }

    let output = RunOutput { selection, report };
    if print_structured(ctx.output(), &output)? {
        return Ok(());
    }
    print_selection_human(&output.selection);
    print_report_human(&output.report);
    if let Some(path) = &args.write {
        println!("Document written to {}", path.display());
    }
    Ok(())
}

fn print_report_human(report: &RunReport) {
    println!();
    println!("Run {} ({} ms)", report.session, report.duration_ms());
    for outcome in &report.outcomes {
        match &outcome.error {
            None => println!("{:>5}  ok", outcome.node.to_string()),
            Some(error) => println!("{:>5}  failed: {}", outcome.node.to_string(), error),
        }
    }
    println!(
        "{} succeeded, {} failed, step {}",
        report.succeeded(),
        report.failed(),
        WorkflowStep::BotRunCompleted
    );
}
