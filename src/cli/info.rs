use anyhow::Result;
use serde::Serialize;

use crate::cli::context::CliContext;
use crate::cli::output::print_structured;

#[derive(Serialize)]
struct InfoOutput<'a> {
    version: &'static str,
    build_date: &'static str,
    git_hash: &'static str,
    git_branch: &'static str,
    config_path: String,
    config_found: bool,
    config: &'a crate::config::Config,
}

pub async fn cmd_info(ctx: &CliContext) -> Result<()> {
    let config = ctx.config();
    let info = InfoOutput {
        version: env!("CARGO_PKG_VERSION"),
        build_date: option_env!("BUILD_DATE").unwrap_or("unknown"),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
        git_branch: option_env!("GIT_BRANCH").unwrap_or("unknown"),
        config_path: ctx.config_path().display().to_string(),
        config_found: ctx.config_path().exists(),
        config,
    };
    if print_structured(ctx.output(), &info)? {
        return Ok(());
    }

    println!("SoulPick Information");
    println!("====================");
    println!("Version: {}", info.version);
    println!("Build Date: {}", info.build_date);
    println!("Git Commit: {} ({})", info.git_hash, info.git_branch);
    println!();

    println!("Configuration:");
    println!(
        "- Config File: {}{}",
        info.config_path,
        if info.config_found { "" } else { " (not found, defaults)" }
    );
    println!(
        "- Marker Classes: selected={} predicted={} highlighted={}",
        config.markers.selected, config.markers.predicted, config.markers.highlighted
    );
    if config.ignored_classes.is_empty() {
        println!("- Ignored Classes: (markers only)");
    } else {
        println!("- Ignored Classes: {}", config.ignored_classes.join(", "));
    }
    println!(
        "- Host Selector: {}",
        config.host_selector.as_deref().unwrap_or("(none)")
    );
    println!("- Click Notice: {}", config.click_notice);
    Ok(())
}
