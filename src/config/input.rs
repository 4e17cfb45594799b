// src/config/input.rs

use serde::{Serialize, Deserialize};
use crate::error::{Error, Result};
use crate::ingest::InputFormat;
use super::FromIni;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    // None means infer from the file extension
    pub format: Option<InputFormat>,
    // Separates attribute tokens inside a CSV cell
    pub csv_separator: char,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            format: None,
            csv_separator: ';',
        }
    }
}

impl FromIni for InputConfig {
    fn from_ini_section(&mut self, _section_name: &str, key: &str, value: &str) -> Option<Result<()>> {
        let value = value.trim_matches('"');
        match key {
            "format" => {
                if value.eq_ignore_ascii_case("auto") {
                    self.format = None;
                    return Some(Ok(()));
                }
                match InputFormat::from_str(value) {
                    Some(format) => {
                        self.format = Some(format);
                        Some(Ok(()))
                    },
                    None => Some(Err(Error::Config(
                        format!("Invalid input format (json, csv or auto): {}", value)
                    ))),
                }
            },
            "csv_separator" => {
                let mut chars = value.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => {
                        self.csv_separator = c;
                        Some(Ok(()))
                    },
                    _ => Some(Err(Error::Config(
                        format!("Invalid csv_separator (must be a single character): {}", value)
                    ))),
                }
            },
            _ => None,
        }
    }
}

impl InputConfig {
    pub fn validate(&self) -> Result<()> {
        if self.csv_separator == ',' || self.csv_separator == '"' {
            return Err(Error::Config(
                format!("csv_separator cannot be {:?}", self.csv_separator)
            ));
        }
        Ok(())
    }
}
