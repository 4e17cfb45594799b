// src/config/subsystems/processor.rs

use serde::{Serialize, Deserialize};
use log::warn;
use crate::error::{Error, Result};
use crate::config::FromIni;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    // Run both passes on rayon
    pub parallel: bool,
    // 0 means rayon's global pool
    pub parallel_thread_count: usize,
    // Inputs smaller than this stay sequential
    pub min_parallel_entities: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            parallel_thread_count: 0,
            min_parallel_entities: 512,
        }
    }
}

impl FromIni for ProcessorConfig {
    fn from_ini_section(&mut self, section_name: &str, key: &str, value: &str) -> Option<Result<()>> {
        if section_name != "processor" {
            return None;
        }

        match key {
            "parallel" => {
                match value.parse::<bool>() {
                    Ok(val) => {
                        self.parallel = val;
                        Some(Ok(()))
                    },
                    Err(_) => Some(Err(Error::Config(
                        format!("Invalid parallel (must be true or false): {}", value)
                    ))),
                }
            },
            "parallel_thread_count" => {
                match value.parse() {
                    Ok(count) => {
                        self.parallel_thread_count = count;
                        Some(Ok(()))
                    },
                    Err(_) => Some(Err(Error::Config(
                        format!("Invalid parallel_thread_count: {}", value)
                    ))),
                }
            },
            "min_parallel_entities" => {
                match value.parse() {
                    Ok(count) => {
                        self.min_parallel_entities = count;
                        Some(Ok(()))
                    },
                    Err(_) => Some(Err(Error::Config(
                        format!("Invalid min_parallel_entities: {}", value)
                    ))),
                }
            },
            _ => None,
        }
    }
}

impl ProcessorConfig {
    pub fn validate(&self) -> Result<()> {
        // Thread count of 0 is valid (means use rayon's default)
        if self.parallel_thread_count > 0 {
            let num_cpus = num_cpus::get();
            if self.parallel_thread_count > num_cpus * 2 {
                warn!(
                    "parallel_thread_count {} is high for a system with {} CPUs",
                    self.parallel_thread_count, num_cpus
                );
            }
        }
        Ok(())
    }

    pub fn effective_thread_count(&self) -> usize {
        if self.parallel_thread_count > 0 {
            self.parallel_thread_count
        } else {
            num_cpus::get()
        }
    }
}
