pub mod db;
pub mod error;
pub mod focus;
pub mod models;
pub mod perception;
pub mod presentation;
pub mod sensing;
pub mod settings;
pub mod stats;
pub mod utils;

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use db::Database;
use focus::{FocusController, SessionResources};
use log::info;
use models::{SessionRecord, VideoHandle};
use perception::{SimulatedCamera, SimulatedPerception};
use presentation::LogSink;
use serde::Serialize;
use settings::{FocusSettings, SettingsStore};
use stats::{daily_breakdown, DailyFocus, FocusStats, WeekComparison};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionReport {
    session: SessionRecord,
    history: FocusStats,
    week: WeekComparison,
    days: Vec<DailyFocus>,
}

fn data_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("CURRIQ_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::data_dir()
        .map(|dir| dir.join("curriq"))
        .ok_or_else(|| anyhow!("could not determine a data directory; set CURRIQ_DATA_DIR"))
}

/// Runs one simulated focus session and prints the summary with dashboard stats.
pub fn run() -> Result<()> {
    utils::logging::init_logging();
    info!("Curriq starting up...");

    let app_data_dir = data_dir()?;
    std::fs::create_dir_all(&app_data_dir)
        .with_context(|| format!("failed to create {}", app_data_dir.display()))?;

    let settings_store = SettingsStore::new(app_data_dir.join("settings.json"))?;
    let database = Database::new(app_data_dir.join("curriq.sqlite3"))?;

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(run_session(settings_store.focus(), database))
}

async fn run_session(settings: FocusSettings, database: Database) -> Result<()> {
    let controller: FocusController<SimulatedPerception, SimulatedCamera> =
        FocusController::new(Arc::new(LogSink), &settings).with_database(database.clone());

    controller
        .start(SessionResources {
            perception: SimulatedPerception::new(),
            camera: SimulatedCamera::new(),
            video: VideoHandle::new(settings.camera_device.clone()),
        })
        .await?;

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(settings.demo_session_secs)) => {
            info!("session time limit of {}s reached", settings.demo_session_secs);
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for ctrl-c")?;
            info!("interrupted, closing session");
        }
    }

    let summary = controller
        .stop()
        .await
        .context("focus session ended before it could be stopped")?;

    let history = database.list_focus_sessions().await?;
    let today = Utc::now().date_naive();
    let report = SessionReport {
        session: SessionRecord::from(&summary),
        history: FocusStats::from_sessions(&history),
        week: WeekComparison::compute(&history, today),
        days: daily_breakdown(&history, today, 7),
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
