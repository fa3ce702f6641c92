//! Fire-Alarm Backend - Main Entry Point

use api::{init_logging, run_server, AppState, Settings};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    info!("=== FlameWatch Fire-Alarm Backend v{} ===", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load()?;
    let state = Arc::new(AppState::new(&settings));

    run_server(&settings.bind_addr, state).await?;

    Ok(())
}
