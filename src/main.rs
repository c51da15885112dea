use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use spinify_sync::{
    config::Settings,
    externals::{
        console::task::task_console_commands,
        event_logging::{
            task::{task_notification_logging, task_snapshot_logging},
            EventLoggingModule,
        },
        remote::RemoteModule,
    },
    internals::core::dashboard::Dashboard,
};
use tokio::{signal, sync::broadcast};
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(false)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // NOTE: Optional path to a config file, otherwise ./spinify-sync.toml if present.
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let settings = Settings::load(config_path.as_deref()).context("Failed to load settings")?;
    info!("Using server at {}.", settings.server.base_url);

    let RemoteModule { ports } =
        RemoteModule::initialize(&settings.server).context("Failed to create remote client")?;

    let tracker = TaskTracker::new();
    let token = CancellationToken::new();

    let (tx_notification, rx_notification) = broadcast::channel(32);
    let EventLoggingModule {
        notification_adapter,
    } = EventLoggingModule::initialize(tx_notification);

    let dashboard = Arc::new(Dashboard::mount(
        &ports,
        notification_adapter,
        settings.dashboard_config(),
    ));

    let token_clone = token.clone();
    tracker.spawn(async { task_notification_logging(token_clone, rx_notification).await });

    let token_clone = token.clone();
    let rx_snapshot = dashboard.snapshots();
    tracker.spawn(async { task_snapshot_logging(token_clone, rx_snapshot).await });

    let token_clone = token.clone();
    let dashboard_clone = dashboard.clone();
    tracker.spawn(async { task_console_commands(token_clone, dashboard_clone).await });

    let token_clone = token.clone();

    tokio::select! {
        _ = token_clone.cancelled() => {}
        res = signal::ctrl_c() => {
            match res {
                Ok(_) => {
                    token.cancel();
                },
                Err(e)=>{
                    tracing::error!("Failed to listen for ctrl_c. Error: {}", e);
                    token.cancel();
                }
            };
        },
    }

    dashboard.unmount();
    tracker.close();
    tracker.wait().await;

    Ok(())
}
