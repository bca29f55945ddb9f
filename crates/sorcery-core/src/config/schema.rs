//! Static field descriptors: the single source of truth for what a valid
//! configuration document looks like.
//!
//! Validation (`validate.rs`) and the help/introspection surface
//! (`schema_info`, `generate_documentation`) both read from [`FIELDS`].

use serde::Serialize;
use toml::Value;

use super::Interpolation;

/// Semantic type of a field, as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Float,
    Integer,
    String,
    IntList,
    Boolean,
}

impl FieldType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Integer => "integer",
            Self::String => "string",
            Self::IntList => "list[int]",
            Self::Boolean => "boolean",
        }
    }
}

/// Rule a field value must satisfy beyond its type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraint {
    /// Any value of the right type; the text documents what is expected
    Free(&'static str),
    /// Inclusive float range
    Between { min: f64, max: f64 },
    /// Strictly greater than
    Above(f64),
    /// Integer lower bound
    AtLeast(i64),
    /// Odd integer with lower bound
    OddAtLeast(i64),
    /// Exactly three integers, each 0-255
    ColorTriple,
    /// Membership in a fixed set of strings
    OneOf(&'static [&'static str]),
    /// Plain boolean
    Flag,
}

impl Constraint {
    /// Human-readable form used in schema info.
    pub fn describe(&self) -> String {
        match self {
            Self::Free(text) => (*text).to_string(),
            Self::Between { min, max } => format!("{min:?} ≤ value ≤ {max:?}"),
            Self::Above(min) => format!("Value > {min:?}"),
            Self::AtLeast(min) => format!("Value ≥ {min}"),
            Self::OddAtLeast(min) => format!("Odd number ≥ {min}"),
            Self::ColorTriple => "3 integers, each 0-255".to_string(),
            Self::OneOf(options) => format!("One of: {}", options.join(", ")),
            Self::Flag => "true or false".to_string(),
        }
    }
}

/// Descriptor of one configuration leaf.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub section: &'static str,
    pub name: &'static str,
    pub ty: FieldType,
    pub constraint: Constraint,
    pub description: &'static str,
}

/// Integer fields are stored as `u32`.
const INT_FIELD_MAX: i64 = u32::MAX as i64;

/// Section names in declaration order.
pub const SECTIONS: &[&str] = &[
    "detection",
    "find",
    "blur",
    "text",
    "drawing",
    "ocr",
    "resize",
    "telemetry",
];

pub const FIELDS: &[FieldSpec] = &[
    FieldSpec {
        section: "detection",
        name: "confidence_threshold",
        ty: FieldType::Float,
        constraint: Constraint::Between { min: 0.0, max: 1.0 },
        description: "Default confidence threshold for object detection (0.0-1.0)",
    },
    FieldSpec {
        section: "detection",
        name: "default_model",
        ty: FieldType::String,
        constraint: Constraint::Free("Valid model filename"),
        description: "Default model for detection tool",
    },
    FieldSpec {
        section: "find",
        name: "confidence_threshold",
        ty: FieldType::Float,
        constraint: Constraint::Between { min: 0.0, max: 1.0 },
        description: "Default confidence threshold for object finding (0.0-1.0)",
    },
    FieldSpec {
        section: "find",
        name: "default_model",
        ty: FieldType::String,
        constraint: Constraint::Free("Valid model filename"),
        description: "Default model for find tool",
    },
    FieldSpec {
        section: "blur",
        name: "strength",
        ty: FieldType::Integer,
        constraint: Constraint::OddAtLeast(1),
        description: "Default blur strength (must be odd number)",
    },
    FieldSpec {
        section: "text",
        name: "font_scale",
        ty: FieldType::Float,
        constraint: Constraint::Above(0.0),
        description: "Default font scale for text drawing",
    },
    FieldSpec {
        section: "drawing",
        name: "color",
        ty: FieldType::IntList,
        constraint: Constraint::ColorTriple,
        description: "Default color in BGR format [B,G,R]",
    },
    FieldSpec {
        section: "drawing",
        name: "thickness",
        ty: FieldType::Integer,
        constraint: Constraint::AtLeast(1),
        description: "Default line thickness",
    },
    FieldSpec {
        section: "ocr",
        name: "language",
        ty: FieldType::String,
        constraint: Constraint::Free("Valid language code (e.g., 'en', 'fr', 'ru')"),
        description: "Default OCR language code",
    },
    FieldSpec {
        section: "resize",
        name: "interpolation",
        ty: FieldType::String,
        constraint: Constraint::OneOf(Interpolation::NAMES),
        description: "Default resize interpolation method",
    },
    FieldSpec {
        section: "telemetry",
        name: "enabled",
        ty: FieldType::Boolean,
        constraint: Constraint::Flag,
        description: "Enable or disable anonymous telemetry",
    },
];

/// Look up the descriptor for `section.name`.
pub fn field(section: &str, name: &str) -> Option<&'static FieldSpec> {
    FIELDS
        .iter()
        .find(|spec| spec.section == section && spec.name == name)
}

pub fn is_section(name: &str) -> bool {
    SECTIONS.contains(&name)
}

/// Short name of a raw value's type, for error messages.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::String(_) => "string",
        Value::Integer(_) => "integer",
        Value::Float(_) => "float",
        Value::Boolean(_) => "boolean",
        Value::Datetime(_) => "datetime",
        Value::Array(_) => "list",
        Value::Table(_) => "table",
    }
}

impl FieldSpec {
    /// Full dot-path of the field.
    pub fn key(&self) -> String {
        format!("{}.{}", self.section, self.name)
    }

    /// Check a raw value against type and constraint, returning the broken
    /// rule on failure.
    ///
    /// Integers are accepted for float fields; nothing else is coerced.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        let mismatch = || {
            format!(
                "expected {}, got {}",
                self.ty.name(),
                type_name(value)
            )
        };

        match self.ty {
            FieldType::Float => {
                let v = match value {
                    Value::Float(f) => *f,
                    Value::Integer(i) => *i as f64,
                    _ => return Err(mismatch()),
                };
                self.check_float(v)
            }
            FieldType::Integer => match value {
                Value::Integer(i) => self.check_int(*i),
                _ => Err(mismatch()),
            },
            FieldType::String => match value {
                Value::String(s) => self.check_str(s),
                _ => Err(mismatch()),
            },
            FieldType::IntList => match value {
                Value::Array(items) => {
                    let ints = items
                        .iter()
                        .map(|item| item.as_integer().ok_or_else(mismatch))
                        .collect::<Result<Vec<_>, _>>()?;
                    self.check_ints(&ints)
                }
                _ => Err(mismatch()),
            },
            FieldType::Boolean => match value {
                Value::Boolean(_) => Ok(()),
                _ => Err(mismatch()),
            },
        }
    }

    fn check_float(&self, v: f64) -> Result<(), String> {
        match self.constraint {
            Constraint::Between { min, max } if !(min..=max).contains(&v) => Err(format!(
                "must be between {min:?} and {max:?} (got {v})"
            )),
            Constraint::Above(min) if !(v > min) => {
                Err(format!("must be greater than {min:?} (got {v})"))
            }
            _ => Ok(()),
        }
    }

    fn check_int(&self, v: i64) -> Result<(), String> {
        match self.constraint {
            Constraint::AtLeast(_) | Constraint::OddAtLeast(_) if v > INT_FIELD_MAX => Err(format!(
                "must be <= {INT_FIELD_MAX} (got {v})"
            )),
            Constraint::AtLeast(min) if v < min => Err(format!("must be >= {min} (got {v})")),
            Constraint::OddAtLeast(min) if v < min => Err(format!("must be >= {min} (got {v})")),
            Constraint::OddAtLeast(_) if v % 2 == 0 => {
                Err(format!("must be an odd number (got {v})"))
            }
            _ => Ok(()),
        }
    }

    fn check_str(&self, v: &str) -> Result<(), String> {
        match self.constraint {
            Constraint::OneOf(options) if !options.contains(&v) => Err(format!(
                "must be one of: {} (got '{v}')",
                options.join(", ")
            )),
            _ => Ok(()),
        }
    }

    fn check_ints(&self, values: &[i64]) -> Result<(), String> {
        if let Constraint::ColorTriple = self.constraint {
            if values.len() != 3 {
                return Err(format!(
                    "must contain exactly 3 values (got {})",
                    values.len()
                ));
            }
            if let Some(bad) = values.iter().find(|v| !(0..=255).contains(*v)) {
                return Err(format!("values must be between 0 and 255 (got {bad})"));
            }
        }
        Ok(())
    }
}

/// Introspection record for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldInfo {
    pub description: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub constraints: String,
}

/// Dot-path → description/type/constraints for every field, in declaration
/// order.
pub fn schema_info() -> Vec<(String, FieldInfo)> {
    FIELDS
        .iter()
        .map(|spec| {
            (
                spec.key(),
                FieldInfo {
                    description: spec.description.to_string(),
                    ty: spec.ty.name().to_string(),
                    constraints: spec.constraint.describe(),
                },
            )
        })
        .collect()
}

/// Every addressable leaf dot-path.
pub fn available_keys() -> Vec<String> {
    FIELDS.iter().map(FieldSpec::key).collect()
}

/// Help text listing every key and its description.
pub fn generate_documentation() -> String {
    let mut lines = vec!["Available configuration keys:".to_string()];
    for spec in FIELDS {
        lines.push(format!("- {}: {}", spec.key(), spec.description));
    }
    lines.join("\n")
}
