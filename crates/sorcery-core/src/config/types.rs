//! Section structs with their defaults.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Object detection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Minimum confidence for a detection to be reported
    pub confidence_threshold: f64,

    /// Model file used when the caller does not name one
    pub default_model: String,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.75,
            default_model: "yoloe-11l-seg-pf.pt".to_string(),
        }
    }
}

/// Text-prompted object finding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FindConfig {
    /// Minimum confidence for a match to be reported
    pub confidence_threshold: f64,

    /// Model file used when the caller does not name one
    pub default_model: String,
}

impl Default for FindConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.75,
            default_model: "yoloe-11l-seg.pt".to_string(),
        }
    }
}

/// Blur settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlurConfig {
    /// Gaussian kernel size; always odd
    pub strength: u32,
}

impl Default for BlurConfig {
    fn default() -> Self {
        Self { strength: 15 }
    }
}

/// Text drawing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub font_scale: f64,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self { font_scale: 1.0 }
    }
}

/// Shape drawing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingConfig {
    /// Default colour in BGR order
    pub color: [u8; 3],

    /// Default line thickness in pixels
    pub thickness: u32,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            color: [0, 0, 0],
            thickness: 1,
        }
    }
}

/// OCR settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Language code passed to the recognizer
    pub language: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
        }
    }
}

/// Resampling method used by resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    Nearest,
    #[default]
    Linear,
    Area,
    Cubic,
    Lanczos,
}

impl Interpolation {
    /// Accepted spellings, in documentation order.
    pub const NAMES: &'static [&'static str] = &["nearest", "linear", "area", "cubic", "lanczos"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Linear => "linear",
            Self::Area => "area",
            Self::Cubic => "cubic",
            Self::Lanczos => "lanczos",
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interpolation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nearest" => Ok(Self::Nearest),
            "linear" => Ok(Self::Linear),
            "area" => Ok(Self::Area),
            "cubic" => Ok(Self::Cubic),
            "lanczos" => Ok(Self::Lanczos),
            other => Err(format!(
                "Invalid interpolation method '{other}'. Choose from: {}",
                Self::NAMES.join(", ")
            )),
        }
    }
}

/// Resize settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeConfig {
    pub interpolation: Interpolation,
}

/// Anonymous usage telemetry settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Off unless the user opts in
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_defaults() {
        assert_eq!(DetectionConfig::default().confidence_threshold, 0.75);
        assert_eq!(DetectionConfig::default().default_model, "yoloe-11l-seg-pf.pt");
        assert_eq!(FindConfig::default().default_model, "yoloe-11l-seg.pt");
        assert_eq!(BlurConfig::default().strength, 15);
        assert_eq!(TextConfig::default().font_scale, 1.0);
        assert_eq!(DrawingConfig::default().color, [0, 0, 0]);
        assert_eq!(DrawingConfig::default().thickness, 1);
        assert_eq!(OcrConfig::default().language, "en");
        assert_eq!(ResizeConfig::default().interpolation, Interpolation::Linear);
        assert!(!TelemetryConfig::default().enabled);
    }

    #[test]
    fn test_interpolation_parse() {
        for name in Interpolation::NAMES {
            let parsed: Interpolation = name.parse().unwrap();
            assert_eq!(parsed.as_str(), *name);
        }
        let err = "bilinear".parse::<Interpolation>().unwrap_err();
        assert!(err.contains("nearest, linear, area, cubic, lanczos"));
    }
}
