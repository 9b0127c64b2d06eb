use color_eyre::{eyre::eyre, Result};
use eframe::egui;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use elevator_dashboard::config::DashboardConfig;
use elevator_dashboard::mqtt::{RumqttTransport, SyncHandle};
use elevator_dashboard::sound::{SoundService, TracingPlayer};
use elevator_dashboard::store::StateBridge;
use elevator_dashboard::ui::DashboardUI;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    if let Err(e) = DashboardConfig::ensure_default_config().await {
        warn!("Could not create default config: {}", e);
    }
    let config = DashboardConfig::load().await;
    info!("Loaded config, last broker {}", config.broker);

    let (sync_handle, worker) = SyncHandle::spawn(RumqttTransport::default());
    let bridge = StateBridge::attach(sync_handle.clone());

    let runtime = tokio::runtime::Handle::current();
    let store = bridge.store();
    let sound = SoundService::new(Box::new(TracingPlayer), config.sound.muted);

    info!("Starting UI");
    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = egui::ViewportBuilder::default()
        .with_title("Elevator Dashboard")
        .with_inner_size([1280.0, 800.0]);

    let ui_result = eframe::run_native(
        "Elevator Dashboard",
        native_options,
        Box::new(|cc| Ok(Box::new(DashboardUI::new(cc, runtime, store, config, sound)))),
    );

    bridge.detach();
    sync_handle.shutdown();
    if let Err(e) = worker.await {
        warn!("Status sync worker ended abnormally: {}", e);
    }

    ui_result.map_err(|e| eyre!("UI terminated with error: {}", e))
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
