pub mod color;
pub mod db;
pub mod models;
pub mod recorder;
pub mod scoring;
pub mod session;
pub mod settings;
pub mod trials;
pub mod utils;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use db::Database;
use models::{PickerTrial, RunUnavailable};
use settings::SettingsStore;

pub use models::{BatteryResults, BatteryRun};
pub use scoring::score_battery;
pub use session::BatteryController;

const ENABLE_LOGS: bool = true;

const USAGE: &str = "usage: synesthesia-battery new | <plan|progress|results|restart> <run-id>";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlannedTrial {
    index: usize,
    #[serde(flatten)]
    trial: PickerTrial,
    suggested_hex: String,
}

pub fn run() {
    utils::init_logging(settings::debug_mode());

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = tokio::runtime::Runtime::new()
        .context("failed to start async runtime")
        .and_then(|runtime| runtime.block_on(run_command(&args)));

    if let Err(err) = result {
        if let Some(reason) = err.downcast_ref::<RunUnavailable>() {
            log_error!("Run unavailable: {reason}");
        } else {
            log_error!("{err:#}");
        }
        std::process::exit(1);
    }
}

async fn run_command(args: &[String]) -> Result<()> {
    let data_dir = settings::data_dir();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;
    let settings_store = SettingsStore::new(data_dir.join("settings.json"))?;
    let settings = settings_store.settings();
    let database = Database::new(data_dir.join("battery.sqlite3"))?;

    let (command, run_id) = match args {
        [command] if command == "new" => {
            let run_id = models::generate_run_id();
            let controller = BatteryController::open(database, &run_id, settings).await?;
            println!("{}", serde_json::to_string_pretty(&controller.progress().await)?);
            return Ok(());
        }
        [command, run_id] => (command.as_str(), run_id.as_str()),
        _ => bail!(USAGE),
    };

    match command {
        "progress" => {
            let controller = BatteryController::open(database, run_id, settings).await?;
            println!("{}", serde_json::to_string_pretty(&controller.progress().await)?);
        }
        "plan" => {
            let run = match database.load_run(run_id).await? {
                Some(record) => BatteryRun::from_record(run_id, record)?,
                None => BatteryRun::new(
                    run_id,
                    settings.repeats,
                    settings.picker_plan(),
                    chrono::Utc::now(),
                ),
            };
            let planned: Vec<PlannedTrial> = run
                .picker_trials()
                .into_iter()
                .enumerate()
                .map(|(index, trial)| PlannedTrial {
                    index,
                    suggested_hex: trials::suggested_hex(run_id, &trial),
                    trial,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&planned)?);
        }
        "results" => {
            let repeats = match database.load_run(run_id).await? {
                Some(record) => record.repeats,
                None => return Err(RunUnavailable::Missing.into()),
            };
            let results = database.get_results(run_id, repeats).await?;
            log_info!(
                "Scored run {run_id}: picker score {:.3} over {} stimuli",
                results.picker_score,
                results.picker_rows.len()
            );
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        "restart" => {
            database
                .clear_run(run_id, settings.repeats, settings.picker_plan())
                .await?;
            println!("Cleared saved progress for {run_id}");
        }
        other => bail!("unknown command '{other}'\n{USAGE}"),
    }

    Ok(())
}
