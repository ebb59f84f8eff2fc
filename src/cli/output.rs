use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
    Yaml,
}

/// Prints `value` as JSON or YAML. Returns `false` for human output so the
/// caller can render its own text.
pub fn print_structured<T: Serialize>(format: &OutputFormat, value: &T) -> Result<bool> {
    match format {
        OutputFormat::Human => Ok(false),
        OutputFormat::Json => {
            let rendered =
                serde_json::to_string_pretty(value).context("Failed to render JSON output")?;
            println!("{}", rendered);
            Ok(true)
        }
        OutputFormat::Yaml => {
            let rendered = serde_yaml::to_string(value).context("Failed to render YAML output")?;
            print!("{}", rendered);
            Ok(true)
        }
    }
}
