//! Plugin configuration, loaded once from `config.toml` in the plugin data folder.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("write default config {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level config file layout.
///
/// Every field falls back to its default, so a partial file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardsConfig {
    /// Log title, id and frame of every announced advancement.
    pub debug: bool,
    /// Award points by advancement frame.
    pub simple_advancement_points: bool,
    pub task_points: i64,
    pub goal_points: i64,
    pub challenge_points: i64,
    /// Award points from per-advancement reward files.
    pub individual_advancement_points: bool,
    /// Write a zero-point placeholder for advancements without a reward file.
    pub write_default_reward_data: bool,
    pub storage: StorageConfig,
    pub notifications: NotificationConfig,
    pub commands: CommandConfig,
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            debug: false,
            simple_advancement_points: true,
            task_points: 1,
            goal_points: 2,
            challenge_points: 5,
            individual_advancement_points: true,
            write_default_reward_data: true,
            storage: StorageConfig::default(),
            notifications: NotificationConfig::default(),
            commands: CommandConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding `<sanitized-id>.json` reward files. Relative to the data folder.
    pub reward_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            reward_dir: PathBuf::from("kubejs/script_data/advancement_rewards"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Ticks between applying a reward and telling the player about it.
    pub delay_ticks: u32,
    /// Lang file overriding the bundled English strings. Relative to the data folder.
    pub lang_file: Option<PathBuf>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            delay_ticks: 1,
            lang_file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Root of the stat command, without the leading slash.
    pub stat_command: String,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            stat_command: "playerstats".into(),
        }
    }
}

impl RewardsConfig {
    /// Load config from a TOML file, writing the bundled default first if it doesn't exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(toml::from_str(&text)?)
        } else {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
            std::fs::write(path, DEFAULT_CONFIG).map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            log::info!("advancement_rewards: Created default config at {path:?}");
            Ok(toml::from_str(DEFAULT_CONFIG)?)
        }
    }

    /// Reward directory resolved against the plugin data folder.
    #[must_use]
    pub fn reward_dir(&self, data_folder: &Path) -> PathBuf {
        data_folder.join(&self.storage.reward_dir)
    }

    /// Lang file override resolved against the plugin data folder, if one is set.
    #[must_use]
    pub fn lang_file(&self, data_folder: &Path) -> Option<PathBuf> {
        self.notifications
            .lang_file
            .as_ref()
            .map(|file| data_folder.join(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_config_matches_defaults() {
        let parsed: RewardsConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, RewardsConfig::default());
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let parsed: RewardsConfig = toml::from_str(
            "task_points = 50\nindividual_advancement_points = false\n[notifications]\ndelay_ticks = 3\n",
        )
        .unwrap();
        assert_eq!(parsed.task_points, 50);
        assert!(!parsed.individual_advancement_points);
        assert_eq!(parsed.notifications.delay_ticks, 3);
        assert_eq!(parsed.goal_points, 2);
        assert_eq!(parsed.commands.stat_command, "playerstats");
    }

    #[test]
    fn load_writes_default_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = RewardsConfig::load(&path).unwrap();

        assert_eq!(config, RewardsConfig::default());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }

    #[test]
    fn load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "task_points = \"many\"").unwrap();

        assert!(matches!(
            RewardsConfig::load(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn paths_resolve_against_data_folder() {
        let mut config = RewardsConfig::default();
        let data = Path::new("/srv/plugins/advancement_rewards");
        assert_eq!(
            config.reward_dir(data),
            data.join("kubejs/script_data/advancement_rewards")
        );
        assert_eq!(config.lang_file(data), None);

        config.notifications.lang_file = Some(PathBuf::from("lang/de_de.json"));
        assert_eq!(config.lang_file(data), Some(data.join("lang/de_de.json")));
    }
}
