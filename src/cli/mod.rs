pub mod app;
pub mod commands;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod info;
pub mod inspect;
pub mod output;
pub mod predict;
pub mod query;
pub mod run;
pub mod runtime;
