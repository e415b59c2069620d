//! JSON snapshot export and import.
//!
//! # Responsibility
//! - Shape export snapshots and their file names.
//! - Validate import payloads before anything touches the store.
//!
//! # Invariants
//! - Import is all-or-nothing: a payload either decodes completely or is
//!   rejected.
//! - The top-level object must carry `entities` as a JSON array.

use crate::model::entity::Entity;
use crate::model::timestamp;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Schema version written to persisted and exported payloads.
pub const SCHEMA_VERSION: &str = "1.0";

const EXPORT_FILE_PREFIX: &str = "orgspace-export-";

/// Downloadable snapshot of the whole store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot {
    pub entities: Vec<Entity>,
    #[serde(with = "timestamp::required")]
    pub export_date: DateTime<Utc>,
    pub version: String,
}

impl ExportSnapshot {
    pub fn new(entities: Vec<Entity>, export_date: DateTime<Utc>) -> Self {
        Self {
            entities,
            export_date,
            version: SCHEMA_VERSION.to_string(),
        }
    }

    /// Pretty JSON with two-space indentation.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Suggested file name, keyed by the export date.
    pub fn file_name(&self) -> String {
        export_file_name(self.export_date.date_naive())
    }
}

/// Returns `orgspace-export-<YYYY-MM-DD>.json`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("{EXPORT_FILE_PREFIX}{}.json", timestamp::format_date(&date))
}

/// Rejection reasons for an import payload.
#[derive(Debug)]
pub enum ImportError {
    /// The file is not valid JSON at all.
    InvalidJson(serde_json::Error),
    /// Valid JSON without an `entities` array at the top level.
    MissingEntities,
    /// `entities` is an array but an element is not a valid entity.
    InvalidEntity { index: usize, message: String },
}

impl ImportError {
    /// Message suitable for showing to the user verbatim.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidJson(err) => format!("Error reading file: {err}"),
            Self::MissingEntities | Self::InvalidEntity { .. } => {
                "Invalid file format".to_string()
            }
        }
    }
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidJson(err) => write!(f, "import is not valid JSON: {err}"),
            Self::MissingEntities => write!(f, "import must contain an `entities` array"),
            Self::InvalidEntity { index, message } => {
                write!(f, "import entity #{index} is malformed: {message}")
            }
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidJson(err) => Some(err),
            Self::MissingEntities | Self::InvalidEntity { .. } => None,
        }
    }
}

/// Decodes an import payload into the entities that will replace the store.
///
/// Extra top-level keys (`exportDate`, `version`, ...) are ignored.
pub fn parse_import(text: &str) -> Result<Vec<Entity>, ImportError> {
    let payload: Value = serde_json::from_str(text).map_err(ImportError::InvalidJson)?;
    let Some(raw_entities) = payload.get("entities").and_then(Value::as_array) else {
        return Err(ImportError::MissingEntities);
    };

    raw_entities
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            Entity::deserialize(raw).map_err(|err| ImportError::InvalidEntity {
                index,
                message: err.to_string(),
            })
        })
        .collect()
}
