//! Document validation against the field descriptors.

use toml::Table;

use super::schema::{self, type_name};
use crate::error::{ConfigError, Violation};

/// Check every section and field of a raw document, collecting all
/// violations rather than stopping at the first.
pub(crate) fn validate_document(document: &Table) -> Result<(), ConfigError> {
    let mut violations = Vec::new();

    for (section, value) in document {
        if !schema::is_section(section) {
            violations.push(Violation::new(section, "unknown section"));
            continue;
        }
        let Some(fields) = value.as_table() else {
            violations.push(Violation::new(
                section,
                format!("expected a table, got {}", type_name(value)),
            ));
            continue;
        };
        for (name, value) in fields {
            let path = format!("{section}.{name}");
            match schema::field(section, name) {
                Some(spec) => {
                    if let Err(rule) = spec.check(value) {
                        violations.push(Violation::new(path, rule));
                    }
                }
                None => violations.push(Violation::new(path, "unknown field")),
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(violations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Table {
        toml::from_str(text).unwrap()
    }

    #[test]
    fn test_empty_document_is_valid() {
        assert!(validate_document(&Table::new()).is_ok());
    }

    #[test]
    fn test_partial_sections_are_valid() {
        let document = doc("[detection]\nconfidence_threshold = 0.8\n\n[blur]\nstrength = 21\n");
        assert!(validate_document(&document).is_ok());
    }

    #[test]
    fn test_collects_every_violation() {
        let document = doc(
            "[detection]\nconfidence_threshold = 1.5\n\n[blur]\nstrength = 20\n\n[drawing]\ncolor = [256, 0, 0]\n",
        );
        let err = validate_document(&document).unwrap_err();
        let paths: Vec<_> = err.violations().iter().map(|v| v.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "blur.strength",
                "detection.confidence_threshold",
                "drawing.color"
            ]
        );
    }

    #[test]
    fn test_rejects_unknown_section_and_field() {
        let document = doc("[colors]\nprimary = 1\n\n[blur]\nradius = 3\n");
        let err = validate_document(&document).unwrap_err();
        let rendered = err.to_string();
        assert!(rendered.contains("colors: unknown section"));
        assert!(rendered.contains("blur.radius: unknown field"));
    }

    #[test]
    fn test_rejects_scalar_section() {
        let mut document = Table::new();
        document.insert("blur".into(), toml::Value::Integer(21));
        let err = validate_document(&document).unwrap_err();
        assert_eq!(
            err.violations(),
            &[Violation::new("blur", "expected a table, got integer")]
        );
    }
}
