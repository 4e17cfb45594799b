// src/ingest/json.rs
use serde::Deserialize;
use std::io::Read;

use crate::error::{Error, Result};
use crate::types::Entity;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

#[derive(Debug, Deserialize)]
struct RawEntity {
    id: RawId,
    #[serde(default)]
    attributes: Option<Vec<String>>,
}

pub fn read_entities<R: Read>(reader: R) -> Result<Vec<Entity>> {
    let records: Vec<RawEntity> = serde_json::from_reader(reader)?;
    records
        .into_iter()
        .map(|record| {
            let id = match record.id {
                RawId::Text(id) if id.is_empty() => {
                    return Err(Error::input("Entity id cannot be empty"))
                }
                RawId::Text(id) => id,
                RawId::Number(id) => id.to_string(),
            };
            Ok(Entity::from_optional(id, record.attributes))
        })
        .collect()
}
