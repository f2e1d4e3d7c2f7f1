//! Per-advancement reward records, stored as one JSON file per advancement.
//!
//! Files are created with zero points and then edited by hand; the plugin never
//! rewrites a file that already exists.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::events::AdvancementId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error on {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("malformed reward record {path:?}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Which stat to raise, and by how much.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardRecord {
    pub skill: String,
    pub points: i64,
}

impl Default for RewardRecord {
    /// Placeholder written for advancements that have no record yet.
    fn default() -> Self {
        Self {
            skill: "points".into(),
            points: 0,
        }
    }
}

impl RewardRecord {
    /// Skill names are spliced into a command line, so only single plain words are accepted.
    #[must_use]
    pub fn has_valid_skill(&self) -> bool {
        !self.skill.is_empty()
            && !self
                .skill
                .chars()
                .any(|c| c.is_whitespace() || c == '/' || c.is_control())
    }
}

/// Storage for reward records, keyed by advancement id.
pub trait RewardStore: Send + Sync {
    /// `Ok(None)` when no record exists for the advancement.
    fn read(&self, id: &AdvancementId) -> Result<Option<RewardRecord>, StoreError>;

    /// Create the record. Existing records are left untouched.
    fn write_default(&self, id: &AdvancementId, record: &RewardRecord) -> Result<(), StoreError>;
}

/// File name stem for an advancement: the first `:` and then the first `/` become `-`.
///
/// `minecraft:story/mine_stone` becomes `minecraft-story-mine_stone`. Deeper paths keep
/// their remaining slashes and so land in subdirectories.
#[must_use]
pub fn sanitize_id(id: &AdvancementId) -> String {
    id.as_str().replacen(':', "-", 1).replacen('/', "-", 1)
}

/// Reward records as `<dir>/<sanitized-id>.json`.
pub struct JsonRewardStore {
    dir: PathBuf,
}

impl JsonRewardStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn record_path(&self, id: &AdvancementId) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_id(id)))
    }
}

impl RewardStore for JsonRewardStore {
    fn read(&self, id: &AdvancementId) -> Result<Option<RewardRecord>, StoreError> {
        let path = self.record_path(id);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| StoreError::Json { path, source })
    }

    fn write_default(&self, id: &AdvancementId, record: &RewardRecord) -> Result<(), StoreError> {
        let path = self.record_path(id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = serde_json::to_string(record).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;

        // create_new so a record written by hand in the meantime is never clobbered.
        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(()),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        io::Write::write_all(&mut file, content.as_bytes())
            .map_err(|source| StoreError::Io { path, source })
    }
}
