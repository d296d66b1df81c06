use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::types::{ActionCategory, MissionId};

/// Top-level configuration for Drover.
///
/// Loaded from `~/.drover/config.toml` by default. `[general]` and
/// `[rewards]` tune the engine; `[[missions]]` entries seed the mission
/// catalog at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DroverConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub rewards: RewardConfig,
    #[serde(default)]
    pub missions: Vec<MissionSeed>,
}

impl DroverConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: DroverConfig = toml::from_str(&content)?;
        info!(
            missions = config.missions.len(),
            "Configuration loaded from {}",
            path.display()
        );
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Engine-wide reward policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Threshold used by `sum` goals that omit their own.
    pub default_sum_threshold: f64,
    /// Threshold used by `count` goals that omit their own.
    pub default_driving_count_threshold: u32,
    /// Whether the price of a finished action is credited to the driver's
    /// balance. When false only awards move the balance.
    pub credit_action_payouts: bool,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            default_sum_threshold: 100_000.0,
            default_driving_count_threshold: 10,
            credit_action_payouts: true,
        }
    }
}

/// A mission declared in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionSeed {
    pub id: MissionId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Start of the evaluation window (RFC 3339).
    pub from_time: DateTime<Utc>,
    /// End of the evaluation window (RFC 3339), inclusive.
    pub deadline: DateTime<Utc>,
    pub goal: GoalConfig,
    #[serde(default)]
    pub awards: Vec<AwardSeed>,
}

/// Completion goal of a seeded mission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GoalConfig {
    /// Total price of the actions in the window reaches `threshold`.
    Sum {
        #[serde(default)]
        threshold: Option<f64>,
    },
    /// Number of `category` actions in the window reaches `threshold`.
    Count {
        #[serde(default = "default_goal_category")]
        category: ActionCategory,
        #[serde(default)]
        threshold: Option<u32>,
    },
}

fn default_goal_category() -> ActionCategory {
    ActionCategory::Driving
}

/// Kind of award a seeded mission grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwardKindConfig {
    Cash,
    Voucher,
}

/// An award declared on a seeded mission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwardSeed {
    pub name: String,
    pub kind: AwardKindConfig,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DroverError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = DroverConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.rewards.default_sum_threshold, 100_000.0);
        assert_eq!(config.rewards.default_driving_count_threshold, 10);
        assert!(config.rewards.credit_action_payouts);
        assert!(config.missions.is_empty());
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[general]
log_level = "debug"

[rewards]
default_sum_threshold = 50000.0
default_driving_count_threshold = 5
credit_action_payouts = false

[[missions]]
id = "weekly-revenue"
title = "Weekly revenue"
description = "Earn 100k this week"
from_time = "2024-03-04T00:00:00Z"
deadline = "2024-03-11T00:00:00Z"
goal = { type = "sum", threshold = 100000.0 }

[[missions.awards]]
name = "Bonus"
kind = "cash"
value = 10000.0

[[missions]]
id = "ten-rides"
title = "Ten rides"
from_time = "2024-03-04T00:00:00Z"
deadline = "2024-03-05T00:00:00Z"
goal = { type = "count" }

[[missions.awards]]
name = "Fuel voucher"
kind = "voucher"
value = 500.0
"#;
        let file = create_temp_config(content);
        let config = DroverConfig::load(file.path()).unwrap();

        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.rewards.default_sum_threshold, 50_000.0);
        assert!(!config.rewards.credit_action_payouts);
        assert_eq!(config.missions.len(), 2);

        let weekly = &config.missions[0];
        assert_eq!(weekly.id, MissionId::new("weekly-revenue"));
        assert_eq!(weekly.goal, GoalConfig::Sum { threshold: Some(100_000.0) });
        assert_eq!(weekly.awards.len(), 1);
        assert_eq!(weekly.awards[0].kind, AwardKindConfig::Cash);
        assert!(weekly.from_time < weekly.deadline);

        let rides = &config.missions[1];
        assert_eq!(rides.description, "");
        assert_eq!(
            rides.goal,
            GoalConfig::Count {
                category: ActionCategory::Driving,
                threshold: None
            }
        );
        assert_eq!(rides.awards[0].kind, AwardKindConfig::Voucher);
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let content = r#"
[general]
log_level = "warn"
"#;
        let file = create_temp_config(content);
        let config = DroverConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.rewards.default_driving_count_threshold, 10);
        assert!(config.missions.is_empty());
    }

    #[test]
    fn test_load_invalid_goal_type_fails() {
        let content = r#"
[[missions]]
id = "m"
title = "m"
from_time = "2024-03-04T00:00:00Z"
deadline = "2024-03-05T00:00:00Z"
goal = { type = "streak" }
"#;
        let file = create_temp_config(content);
        let err = DroverConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, DroverError::Config(_)));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = DroverConfig::load(Path::new("/nonexistent/drover.toml")).unwrap_err();
        assert!(matches!(err, DroverError::Io(_)));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = DroverConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = DroverConfig::default();
        config.missions.push(MissionSeed {
            id: MissionId::new("m1"),
            title: "Ten deliveries".to_string(),
            description: String::new(),
            from_time: "2024-03-04T00:00:00Z".parse().unwrap(),
            deadline: "2024-03-05T00:00:00Z".parse().unwrap(),
            goal: GoalConfig::Count {
                category: ActionCategory::Delivery,
                threshold: Some(10),
            },
            awards: vec![AwardSeed {
                name: "Cash".to_string(),
                kind: AwardKindConfig::Cash,
                value: 100.0,
            }],
        });
        config.save(&path).unwrap();

        let reloaded = DroverConfig::load(&path).unwrap();
        assert_eq!(reloaded.general.log_level, config.general.log_level);
        assert_eq!(reloaded.missions.len(), 1);
        assert_eq!(reloaded.missions[0].goal, config.missions[0].goal);
        assert_eq!(reloaded.missions[0].deadline, config.missions[0].deadline);
    }
}
