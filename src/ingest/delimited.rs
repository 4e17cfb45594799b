// src/ingest/delimited.rs
use std::io::Read;
use log::trace;

use crate::error::{Error, Result};
use crate::types::Entity;

/// Reads `id,attributes` rows; tokens in the attribute cell are split on
/// `separator` and trimmed, blank tokens dropped.
pub fn read_entities<R: Read>(reader: R, separator: char) -> Result<Vec<Entity>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let id_col = column("id").ok_or_else(|| Error::input("CSV input has no 'id' column"))?;
    let attr_col = column("attributes");

    let mut entities = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let id = match record.get(id_col) {
            Some(id) if !id.is_empty() => id,
            _ => return Err(Error::input(format!("Row {} has no id", row + 2))),
        };
        let tokens = attr_col
            .and_then(|col| record.get(col))
            .filter(|cell| !cell.is_empty())
            .map(|cell| {
                cell.split(separator)
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<String>>()
            });
        trace!("Row {}: {} -> {:?}", row + 2, id, tokens);
        entities.push(Entity::from_optional(id, tokens));
    }

    Ok(entities)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_attribute_cells() {
        let input = "id,attributes\nDevice1,WiFi; Bluetooth ;GPS\nDevice3,\nDevice4\n";
        let entities = read_entities(input.as_bytes(), ';').unwrap();

        assert_eq!(entities.len(), 3);
        assert_eq!(entities[0].key().tokens(), ["Bluetooth", "GPS", "WiFi"]);
        assert_eq!(entities[1].attribute_count(), 0);
        assert_eq!(entities[2].attribute_count(), 0);
    }

    #[test]
    fn honours_custom_separator_and_header_order() {
        let input = "attributes,ID\nWiFi|NFC,7\n";
        let entities = read_entities(input.as_bytes(), '|').unwrap();
        assert_eq!(entities[0].id().as_str(), "7");
        assert!(entities[0].has_attribute("NFC"));
    }

    #[test]
    fn missing_id_column_is_an_input_error() {
        let err = read_entities("name,attributes\nx,WiFi\n".as_bytes(), ';').unwrap_err();
        assert!(matches!(err, Error::Input(_)));
    }

    #[test]
    fn blank_id_is_an_input_error() {
        let err = read_entities("id,attributes\n,WiFi\n".as_bytes(), ';').unwrap_err();
        assert!(matches!(err, Error::Input(_)));
    }
}
