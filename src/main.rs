// Betting client entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not the terminal)
// 2. Load config
// 3. Open the session store
// 4. Build the API client
// 5. Create mpsc channels
// 6. Spawn the app orchestrator task
// 7. Run the TUI event loop (blocking until the user quits)
// 8. Cleanup on exit

use paddock::api::ApiClient;
use paddock::app;
use paddock::config;
use paddock::session::SessionStore;
use paddock::tui;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (the terminal belongs to the TUI)
    init_tracing()?;
    info!("Betting client starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: api={}, session db={}",
        config.api.base_url, config.session.db_path
    );

    // 3. Open the session store
    let session = SessionStore::open(&config.session.db_path)
        .context("failed to open session store")?;
    match session.user_name() {
        Ok(Some(name)) => info!("Existing session for {name}"),
        _ => info!("No existing session"),
    }

    // 4. Build the API client
    let api_client =
        ApiClient::from_config(&config.api).context("failed to build API client")?;

    // 5. Create mpsc channels
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (api_tx, api_rx) = mpsc::channel(256);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    let app_state = app::AppState::new(config, session, api_client, api_tx);

    // 6. Spawn the app orchestrator task
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, api_rx, ui_tx, app_state).await {
            error!("Application loop error: {e}");
        }
    });

    // 7. Run the TUI event loop (blocking until the user quits)
    if let Err(e) = tui::run(ui_rx, cmd_tx).await {
        error!("TUI error: {e}");
    }

    // 8. Cleanup: wait for the app task to finish (with timeout)
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("Betting client shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by
/// the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("paddock.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("paddock=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
