// src/config/subsystems/grouper.rs

use serde::{Serialize, Deserialize};
use crate::error::{Error, Result};
use crate::config::FromIni;
use crate::matcher::exact::MIN_GROUP_SIZE;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrouperConfig {
    pub min_group_size: usize,
}

impl Default for GrouperConfig {
    fn default() -> Self {
        Self { min_group_size: MIN_GROUP_SIZE }
    }
}

impl FromIni for GrouperConfig {
    fn from_ini_section(&mut self, section_name: &str, key: &str, value: &str) -> Option<Result<()>> {
        if section_name != "grouper" {
            return None;
        }

        match key {
            "min_group_size" => {
                match value.parse::<usize>() {
                    Ok(size) if size >= MIN_GROUP_SIZE => {
                        self.min_group_size = size;
                        Some(Ok(()))
                    },
                    _ => Some(Err(Error::Config(
                        format!("Invalid min_group_size (must be >= {}): {}", MIN_GROUP_SIZE, value)
                    ))),
                }
            },
            _ => None,
        }
    }
}

impl GrouperConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_group_size < MIN_GROUP_SIZE {
            return Err(Error::Config(
                format!("min_group_size must be at least {}", MIN_GROUP_SIZE)
            ));
        }
        Ok(())
    }
}
