use anyhow::Context;
use backend_api::{init_tracing, run_server, AppState};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();
    init_tracing();

    let settings_path = std::env::var("SETTINGS_PATH").ok().map(PathBuf::from);
    let settings = settings_loader::load_settings_with_fallback(settings_path.as_ref())?;
    let settings = settings_loader::apply_env_overrides(settings, |key| std::env::var(key).ok())?;

    tracing::info!(
        "Mermas API: data dir {}, currency {}",
        settings.data_dir.display(),
        settings.currency_symbol
    );

    let state = AppState::open(&settings)
        .await
        .with_context(|| format!("Opening stores in {}", settings.data_dir.display()))?;
    store::get_or_init(state.config.as_ref())
        .await
        .context("Initializing configuration")?;

    run_server(state, &settings.host, settings.port).await?;

    Ok(())
}
