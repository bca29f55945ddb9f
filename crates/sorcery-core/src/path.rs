//! Dot-path addressing into a raw configuration document.
//!
//! `"detection.confidence_threshold"` navigates table by table. Reads fail
//! on the first missing segment; writes create the missing tables.

use toml::{Table, Value};

use crate::error::ConfigError;

/// Read the value at `path`.
///
/// Fails with [`ConfigError::NotFound`] naming the whole requested path,
/// never auto-creating anything.
pub fn get<'a>(document: &'a Table, path: &str) -> Result<&'a Value, ConfigError> {
    let not_found = || ConfigError::NotFound {
        key: path.to_string(),
        sections: document.keys().cloned().collect(),
    };

    let mut segments = path.split('.');
    let first = segments.next().unwrap_or_default();
    let mut current = document.get(first).ok_or_else(not_found)?;
    for segment in segments {
        current = current
            .as_table()
            .and_then(|table| table.get(segment))
            .ok_or_else(not_found)?;
    }
    Ok(current)
}

/// Write `value` at `path`, creating intermediate tables as needed.
///
/// A plain key addresses a whole section: a table value is merged into the
/// existing section field by field, while any other value replaces the
/// section outright. Intermediate non-table values are replaced by empty
/// tables; the schema rejects the result if that was not intended.
pub fn set(document: &mut Table, path: &str, value: Value) {
    let Some((parents, last)) = path.rsplit_once('.') else {
        merge_section(document, path, value);
        return;
    };

    let mut current = document;
    for segment in parents.split('.') {
        let slot = current
            .entry(segment.to_string())
            .or_insert(Value::Table(Table::new()));
        current = ensure_table(slot);
    }
    current.insert(last.to_string(), value);
}

fn merge_section(document: &mut Table, section: &str, value: Value) {
    match value {
        Value::Table(fields) => {
            let slot = document
                .entry(section.to_string())
                .or_insert(Value::Table(Table::new()));
            let existing = ensure_table(slot);
            for (name, field) in fields {
                existing.insert(name, field);
            }
        }
        other => {
            document.insert(section.to_string(), other);
        }
    }
}

fn ensure_table(slot: &mut Value) -> &mut Table {
    if !slot.is_table() {
        *slot = Value::Table(Table::new());
    }
    match slot {
        Value::Table(table) => table,
        _ => unreachable!("slot was replaced with a table"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Table {
        toml::from_str(text).unwrap()
    }

    #[test]
    fn test_get_leaf_and_section() {
        let document = doc("[blur]\nstrength = 15\n");
        assert_eq!(get(&document, "blur.strength").unwrap().as_integer(), Some(15));
        assert!(get(&document, "blur").unwrap().is_table());
    }

    #[test]
    fn test_get_missing_reports_full_path() {
        let document = doc("[blur]\nstrength = 15\n");
        match get(&document, "blur.radius").unwrap_err() {
            ConfigError::NotFound { key, sections } => {
                assert_eq!(key, "blur.radius");
                assert_eq!(sections, vec!["blur".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(get(&document, "nonexistent.key").is_err());
        assert!(get(&document, "").is_err());
    }

    #[test]
    fn test_get_does_not_descend_into_scalars() {
        let document = doc("[blur]\nstrength = 15\n");
        assert!(get(&document, "blur.strength.value").is_err());
    }

    #[test]
    fn test_set_creates_intermediate_tables() {
        let mut document = Table::new();
        set(&mut document, "detection.confidence_threshold", Value::Float(0.9));
        assert_eq!(
            document["detection"]["confidence_threshold"].as_float(),
            Some(0.9)
        );
    }

    #[test]
    fn test_set_section_merges_fields() {
        let mut document = doc("[drawing]\ncolor = [0, 0, 0]\nthickness = 1\n");
        let mut update = Table::new();
        update.insert("thickness".into(), Value::Integer(3));
        set(&mut document, "drawing", Value::Table(update));

        assert_eq!(document["drawing"]["thickness"].as_integer(), Some(3));
        assert!(document["drawing"].get("color").is_some());
    }

    #[test]
    fn test_set_section_scalar_replaces_section() {
        let mut document = doc("[blur]\nstrength = 15\n");
        set(&mut document, "blur", Value::Integer(7));
        assert_eq!(document["blur"].as_integer(), Some(7));
    }

    #[test]
    fn test_set_replaces_scalar_intermediate() {
        let mut document = doc("[drawing]\ncolor = [0, 0, 0]\n");
        set(&mut document, "drawing.color.blue", Value::Integer(1));
        assert!(document["drawing"]["color"].is_table());
    }
}
