// src/config/subsystems/matcher.rs

use serde::{Serialize, Deserialize};
use crate::error::{Error, Result};
use crate::config::FromIni;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    // Minimum shared attributes for a pair to be reported; must be >= 0
    pub threshold: i64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self { threshold: 2 }
    }
}

impl FromIni for MatcherConfig {
    fn from_ini_section(&mut self, section_name: &str, key: &str, value: &str) -> Option<Result<()>> {
        if section_name != "matcher" {
            return None;
        }

        match key {
            "threshold" => {
                match value.parse::<i64>() {
                    Ok(threshold) if threshold >= 0 => {
                        self.threshold = threshold;
                        Some(Ok(()))
                    },
                    _ => Some(Err(Error::Config(
                        format!("Invalid threshold (must be >= 0): {}", value)
                    ))),
                }
            },
            _ => None,
        }
    }
}

impl MatcherConfig {
    pub fn validate(&self) -> Result<()> {
        if self.threshold < 0 {
            return Err(Error::Config(
                format!("threshold must be >= 0, got {}", self.threshold)
            ));
        }
        Ok(())
    }
}
