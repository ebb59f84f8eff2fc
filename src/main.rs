use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    soulpick_cli::cli::app::run().await
}
