//! Drover application binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Install the tracing subscriber
//! 3. Build the reward engine and seed missions from config
//! 4. Run the requested subcommand and print its JSON output

mod cli;

use std::sync::Arc;

use clap::Parser;
use drover_core::config::{AwardKindConfig, AwardSeed, DroverConfig, GoalConfig, MissionSeed};
use drover_core::types::{ActionCategory, DriverId, MissionId, Timestamp};
use drover_engine::{Action, DriverSummary, RewardEngine};

use cli::{CliArgs, Command};

/// Missions used when the config declares none: one revenue goal and one
/// ride-count goal, both open for a day from `now` and using the
/// `[rewards]` default thresholds.
fn default_missions(now: Timestamp) -> Vec<MissionSeed> {
    let from_time = now.to_datetime();
    let deadline = now.plus_days(1).to_datetime();
    vec![
        MissionSeed {
            id: MissionId::new("daily-revenue"),
            title: "Daily revenue".to_string(),
            description: "Earn the revenue target within a day".to_string(),
            from_time,
            deadline,
            goal: GoalConfig::Sum { threshold: None },
            awards: vec![AwardSeed {
                name: "Revenue bonus".to_string(),
                kind: AwardKindConfig::Cash,
                value: 10_000.0,
            }],
        },
        MissionSeed {
            id: MissionId::new("daily-rides"),
            title: "Daily rides".to_string(),
            description: "Complete the ride target within a day".to_string(),
            from_time,
            deadline,
            goal: GoalConfig::Count {
                category: ActionCategory::Driving,
                threshold: None,
            },
            awards: vec![
                AwardSeed {
                    name: "Ride bonus".to_string(),
                    kind: AwardKindConfig::Cash,
                    value: 2_000.0,
                },
                AwardSeed {
                    name: "Fuel voucher".to_string(),
                    kind: AwardKindConfig::Voucher,
                    value: 500.0,
                },
            ],
        },
    ]
}

/// Create `drivers` drivers, accept every catalog mission for each, then
/// record `actions` rides per driver on blocking tasks.
async fn simulate(
    engine: Arc<RewardEngine>,
    drivers: usize,
    actions: usize,
    price: f64,
    start: Timestamp,
) -> Result<Vec<DriverSummary>, Box<dyn std::error::Error>> {
    let missions = engine.list_all_missions()?;
    let mut ids = Vec::with_capacity(drivers);
    for i in 0..drivers {
        let id = DriverId::new(format!("driver-{}", i + 1));
        let phone = format!("+1555{:06}", i);
        engine.create_driver(id.clone(), format!("Driver {}", i + 1), phone, 0.0)?;
        for mission in &missions {
            if let Err(e) = engine.accept_mission(&id, mission.id(), start) {
                tracing::warn!(
                    driver_id = %id,
                    mission_id = %mission.id(),
                    error = %e,
                    "Mission not accepted"
                );
            }
        }
        ids.push(id);
    }

    let mut handles = Vec::with_capacity(ids.len());
    for id in ids {
        let engine = Arc::clone(&engine);
        handles.push(tokio::task::spawn_blocking(move || {
            let mut completed = 0usize;
            for n in 0..actions {
                let created = start.plus_secs(n as i64 * 60);
                let action = Action::driving("Ride", format!("customer-{}", n + 1), created, price);
                let report = engine.action_done(&id, action, created.plus_secs(30))?;
                completed += report.completed.len();
            }
            tracing::info!(driver_id = %id, completed, "Driver simulation finished");
            Ok::<_, drover_engine::EngineError>(())
        }));
    }
    for handle in handles {
        handle.await??;
    }

    Ok(engine.driver_summaries()?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let config = DroverConfig::load_or_default(&config_file);

    // Tracing. RUST_LOG wins over the flag and the config value.
    let log_level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting Drover v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration resolved");

    // Engine.
    let now = Timestamp::now();
    let engine = Arc::new(RewardEngine::new(config.rewards.clone()));
    let seeds = if config.missions.is_empty() {
        tracing::info!("No missions configured, using built-in defaults");
        default_missions(now)
    } else {
        config.missions.clone()
    };
    let seeded = engine.seed_missions(&seeds)?;
    tracing::info!(missions = seeded.len(), "Mission catalog seeded");

    match args.command {
        Command::Missions => {
            let summaries = engine.mission_summaries()?;
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
        Command::Simulate {
            drivers,
            actions,
            price,
        } => {
            let summaries = simulate(Arc::clone(&engine), drivers, actions, price, now).await?;
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
    }

    Ok(())
}
