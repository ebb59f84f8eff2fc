use super::env::CliArgs;
use super::info::cmd_info;
use super::inspect::cmd_inspect;
use super::predict::cmd_predict;
use super::query::cmd_query;
use super::run::cmd_run;
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use anyhow::Result;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Inspect(args) => cmd_inspect(args, ctx).await,
        Commands::Predict(args) => cmd_predict(args, ctx).await,
        Commands::Query(args) => cmd_query(args, ctx).await,
        Commands::Run(args) => cmd_run(args, ctx).await,
        Commands::Info => cmd_info(ctx).await,
    }
}
