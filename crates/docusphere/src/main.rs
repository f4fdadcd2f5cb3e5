// DocuSphere terminal client entry point.
//
// Startup sequence:
// 1. Parse command-line arguments
// 2. Initialize tracing (log to file, not terminal)
// 3. Load config, apply the base URL override
// 4. Open the local store
// 5. Build the HTTP client
// 6. Create mpsc channels
// 7. Spawn app logic task
// 8. Run the TUI until the user quits
// 9. Cleanup on exit

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{error, info};

use docusphere::api::{DocumentApi, HttpDocumentApi};
use docusphere::app;
use docusphere::config;
use docusphere::store::Store;
use docusphere::tui;

#[derive(Debug, Parser)]
#[command(name = "docusphere", version, about = "Terminal client for the DocuSphere document backend")]
struct Cli {
    /// Browse as this department (e.g. `finance`, `admin`) when no session
    /// is saved. Not persisted.
    #[arg(long, value_name = "SLUG")]
    dept: Option<String>,

    /// Directory holding `config/` and `defaults/`.
    #[arg(long, value_name = "PATH")]
    base_dir: Option<PathBuf>,

    /// Override `api.base_url` from config/client.toml.
    #[arg(long, env = "DOCUSPHERE_API_BASE_URL", value_name = "URL")]
    api_base_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Parse arguments
    let cli = Cli::parse();

    // 2. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("DocuSphere starting up");

    // 3. Load config
    let config = config::load_config(cli.base_dir.as_deref())
        .context("failed to load configuration")?
        .with_api_base_url(cli.api_base_url)
        .context("invalid --api-base-url")?;
    info!(
        "Config loaded: api={}, poll every {}s (ceiling {}s)",
        config.api.trimmed_base_url(),
        config.polling.interval_secs,
        config.polling.ceiling_secs
    );
    if let Some(problem) = config.login_blocker() {
        info!("Login disabled: {}", problem);
    }

    // 4. Open the local store
    let store = Store::open(&config.store_path).context("failed to open local store")?;
    info!("Store opened at {}", config.store_path);

    // 5. Build the HTTP client
    let api: Arc<dyn DocumentApi> = Arc::new(
        HttpDocumentApi::from_config(&config.api).context("failed to build HTTP client")?,
    );

    // 6. Create mpsc channels
    let (api_tx, api_rx) = mpsc::channel(256);
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    let app_state = app::AppState::new(config, Arc::new(store), api, api_tx, cli.dept);

    // 7. Spawn app logic task
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(api_rx, cmd_rx, ui_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    // 8. Run the TUI (blocks until the user quits)
    info!("Application ready");
    if let Err(e) = tui::run(ui_rx, cmd_tx).await {
        error!("TUI error: {:#}", e);
    }

    // 9. Cleanup: the app exits on Quit or when the command channel closes.
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), app_handle).await;

    info!("DocuSphere shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("docusphere.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("docusphere=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
