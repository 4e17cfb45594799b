//! Loaders that turn device files into [`Entity`] collections.
//!
//! Two layouts are accepted: a JSON array of `{"id", "attributes"}` records
//! and a CSV file with `id` and `attributes` columns. Either way a missing or
//! null attribute list is an empty set, and a repeated id is rejected.

pub mod json;
pub mod delimited;

use serde::{Serialize, Deserialize};
use std::path::Path;
use log::info;

use crate::config::input::InputConfig;
use crate::error::{Error, Result};
use crate::matcher::validate_unique_ids;
use crate::types::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    Json,
    Csv,
}

impl InputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputFormat::Json => "json",
            InputFormat::Csv => "csv",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim_matches('"').to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_str)
    }
}

/// Loads entities from `path`, inferring the format from the extension when
/// the config does not name one.
pub fn load_entities<P: AsRef<Path>>(path: P, config: &InputConfig) -> Result<Vec<Entity>> {
    let path = path.as_ref();
    let format = match config.format.or_else(|| InputFormat::from_path(path)) {
        Some(format) => format,
        None => {
            return Err(Error::input(format!(
                "Cannot infer input format of {:?}; use a .json or .csv extension or set [input] format",
                path
            )))
        }
    };

    let entities = match format {
        InputFormat::Json => json::read_entities(std::fs::File::open(path)?)?,
        InputFormat::Csv => delimited::read_entities(std::fs::File::open(path)?, config.csv_separator)?,
    };
    validate_unique_ids(&entities)?;

    info!("Loaded {} entities from {:?} ({})", entities.len(), path, format.as_str());
    Ok(entities)
}
