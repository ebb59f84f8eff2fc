use clap::Subcommand;

use super::inspect::InspectArgs;
use super::predict::PredictArgs;
use super::query::QueryArgs;
use super::run::RunArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// List every element with its id and path selector
    Inspect(InspectArgs),

    /// Show the elements predicted from a selection
    Predict(PredictArgs),

    /// Match a path selector against a document
    Query(QueryArgs),

    /// Select, choose an action and run it over a document
    Run(RunArgs),

    /// Show version, build and configuration details
    Info,
}
