//! SoulPick command-line library
//!
//! Exposes configuration, document IO and the CLI for integration testing

pub mod cli;
pub mod config;
pub mod document;

pub use config::Config;
