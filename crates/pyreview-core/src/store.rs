//! Persisted review reports.
//!
//! Each report is one JSON file, `report_<id>.json`, where the id is the local
//! creation time formatted as `YYYYMMDDHHMMSS`. Records are never modified
//! after creation; saving twice within one second replaces the first record.

use crate::access::{AccessDenied, AccessMode, SafeAccessor};
use crate::state::StateDir;
use crate::types::Report;

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// `chrono` format of report ids.
pub const ID_FORMAT: &str = "%Y%m%d%H%M%S";

const ID_LEN: usize = 14;
const FILE_PREFIX: &str = "report_";
const FILE_SUFFIX: &str = ".json";

/// Errors from the report store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The id is not 14 ASCII digits.
    #[error("Invalid report id: {0:?}")]
    InvalidId(String),

    /// No record with this id.
    #[error("Report not found: {0}")]
    NotFound(String),

    /// The record path was rejected by the safe file accessor.
    #[error(transparent)]
    Denied(#[from] AccessDenied),

    /// Reading or writing the record failed.
    #[error("Failed to access report {path}: {source}")]
    Io {
        /// Record path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The record is not valid report JSON.
    #[error("Malformed report {path}: {source}")]
    Json {
        /// Record path.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}

/// A report together with its id.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredReport {
    /// Creation timestamp id.
    pub report_id: String,
    /// The saved report.
    pub report: Report,
}

impl StoredReport {
    /// Returns the persisted JSON form: the report's fields plus `report_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the report cannot be serialized.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        let mut value = serde_json::to_value(&self.report)?;
        if let Some(map) = value.as_object_mut() {
            map.insert(
                "report_id".to_string(),
                serde_json::Value::String(self.report_id.clone()),
            );
        }
        Ok(value)
    }

    /// Parses the persisted JSON form.
    ///
    /// The id is taken from `fallback_id` when the record does not carry one.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not a file or directory report.
    pub fn from_json(bytes: &[u8], fallback_id: &str) -> Result<Self, serde_json::Error> {
        let mut value: serde_json::Value = serde_json::from_slice(bytes)?;
        let report_id = value
            .as_object_mut()
            .and_then(|map| map.remove("report_id"))
            .and_then(|id| id.as_str().map(str::to_string))
            .unwrap_or_else(|| fallback_id.to_string());
        let report = serde_json::from_value(value)?;
        Ok(Self { report_id, report })
    }
}

/// One line of [`ReportStore::list`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    /// Report id.
    pub id: String,
    /// Report timestamp.
    pub timestamp: DateTime<Local>,
    /// Reviewed file or directory.
    pub target: PathBuf,
    /// Number of issues.
    pub total_issues: usize,
}

/// Saves and retrieves reports in the state directory.
#[derive(Debug, Clone)]
pub struct ReportStore {
    dir: PathBuf,
    accessor: SafeAccessor,
}

impl ReportStore {
    /// Creates a store over `state`'s reports directory.
    #[must_use]
    pub fn new(state: &StateDir) -> Self {
        Self {
            dir: state.reports_dir(),
            accessor: state.accessor(),
        }
    }

    /// Returns the reports directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{FILE_PREFIX}{id}{FILE_SUFFIX}"))
    }

    /// Saves `report` under the current local time and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the record path is denied or the write fails.
    pub fn save(&self, report: &Report) -> Result<String, StoreError> {
        self.save_at(report, Local::now())
    }

    /// Saves `report` under the id derived from `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the record path is denied or the write fails.
    pub fn save_at(&self, report: &Report, now: DateTime<Local>) -> Result<String, StoreError> {
        let id = now.format(ID_FORMAT).to_string();
        let path = self.path_for(&id);
        if path.exists() {
            warn!("Report {} already exists, overwriting", id);
        }

        let stored = StoredReport {
            report_id: id.clone(),
            report: report.clone(),
        };
        let json = stored
            .to_json()
            .and_then(|v| serde_json::to_vec_pretty(&v))
            .map_err(|source| StoreError::Json {
                path: path.clone(),
                source,
            })?;

        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let resolved = self.accessor.resolve(&path, AccessMode::Write)?;
        self.accessor
            .write_atomic(&resolved, &json)
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;

        info!("Saved report {} to {}", id, path.display());
        Ok(id)
    }

    /// Loads the report with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidId`] for malformed ids,
    /// [`StoreError::NotFound`] if no record exists, or another variant if the
    /// record cannot be read.
    pub fn get(&self, id: &str) -> Result<StoredReport, StoreError> {
        if !is_valid_id(id) {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        let path = self.path_for(id);
        if fs::symlink_metadata(&path).is_err() {
            return Err(StoreError::NotFound(id.to_string()));
        }

        let resolved = self.accessor.resolve(&path, AccessMode::Read)?;
        let bytes = self
            .accessor
            .read_bytes(&resolved)
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
        debug!("Loaded report {}", id);
        StoredReport::from_json(&bytes, id).map_err(|source| StoreError::Json { path, source })
    }

    /// Lists saved reports, newest first.
    ///
    /// Records that cannot be read are skipped.
    #[must_use]
    pub fn list(&self) -> Vec<ReportSummary> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("No reports at {}: {}", self.dir.display(), e);
                return Vec::new();
            }
        };

        let mut summaries = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(id) = name
                .to_str()
                .and_then(|n| n.strip_prefix(FILE_PREFIX))
                .and_then(|n| n.strip_suffix(FILE_SUFFIX))
            else {
                continue;
            };
            if !is_valid_id(id) {
                continue;
            }

            match self.get(id) {
                Ok(stored) => summaries.push(ReportSummary {
                    timestamp: stored.report.time(),
                    target: stored.report.target().to_path_buf(),
                    total_issues: stored.report.total_issues(),
                    id: stored.report_id,
                }),
                Err(e) => warn!("Skipping report {}: {}", id, e),
            }
        }

        summaries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
        summaries
    }
}

fn is_valid_id(id: &str) -> bool {
    id.len() == ID_LEN && id.bytes().all(|b| b.is_ascii_digit())
}
