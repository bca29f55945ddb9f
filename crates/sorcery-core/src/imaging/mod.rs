//! Image operations that take their default arguments from [`Config`].
//!
//! - **geometry**: crop, resize, rotate
//! - **paint**: blur, rectangles, fill
//! - **shapes**: circles, lines, arrows
//!
//! Every operation reads one file and writes one file. When no output path
//! is given it is derived from the input (`photo.png` → `photo_<suffix>.png`).

pub mod geometry;
pub mod paint;
pub mod shapes;

pub use geometry::ResizeRequest;
pub use paint::{parse_color, BlurArea, FillArea, RectangleSpec};
pub use shapes::{parse_point, parse_segment, CircleSpec, LineSpec};

use image::{DynamicImage, GenericImageView, ImageFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::{BlurConfig, Config, DrawingConfig, ResizeConfig};
use crate::error::{ImageError, ImageResult};

/// Image operations bound to a configuration snapshot.
#[derive(Debug, Clone)]
pub struct ImageTools {
    blur: BlurConfig,
    drawing: DrawingConfig,
    resize: ResizeConfig,
}

impl ImageTools {
    /// Capture the defaults the operations need from `config`.
    pub fn new(config: &Config) -> Self {
        Self {
            blur: config.blur.clone(),
            drawing: config.drawing.clone(),
            resize: config.resize.clone(),
        }
    }

    /// Dimensions, format, and size of an image file.
    pub fn metainfo(&self, input: &Path) -> ImageResult<ImageInfo> {
        let image = load_image(input)?;
        let (width, height) = image.dimensions();
        let size_bytes = std::fs::metadata(input)
            .map_err(|source| ImageError::Io {
                path: input.to_path_buf(),
                source,
            })?
            .len();
        let format = ImageFormat::from_path(input)
            .ok()
            .and_then(|f| f.extensions_str().first().copied())
            .unwrap_or("unknown")
            .to_string();

        tracing::info!("Image {}: {width}x{height}, {format}", input.display());
        Ok(ImageInfo {
            path: input.to_path_buf(),
            width,
            height,
            format,
            color_type: format!("{:?}", image.color()),
            size_bytes,
        })
    }
}

/// Summary returned by [`ImageTools::metainfo`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub color_type: String,
    pub size_bytes: u64,
}

/// Rectangle given by its top-left `(x1, y1)` and bottom-right `(x2, y2)`
/// corners; the bottom-right edge is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl Area {
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Clip to a `width` x `height` image, returning `(x, y, w, h)`.
    ///
    /// Fails if nothing of the area remains.
    pub fn clip(&self, width: u32, height: u32) -> ImageResult<(u32, u32, u32, u32)> {
        let x1 = self.x1.min(width);
        let y1 = self.y1.min(height);
        let x2 = self.x2.min(width);
        let y2 = self.y2.min(height);
        if x2 <= x1 || y2 <= y1 {
            return Err(ImageError::InvalidArgument(format!(
                "area ({}, {}) to ({}, {}) is empty within a {width}x{height} image",
                self.x1, self.y1, self.x2, self.y2
            )));
        }
        Ok((x1, y1, x2 - x1, y2 - y1))
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        (self.x1..self.x2).contains(&x) && (self.y1..self.y2).contains(&y)
    }
}

impl FromStr for Area {
    type Err = ImageError;

    /// Parse `x1,y1,x2,y2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ImageError::InvalidArgument(format!("invalid area '{s}': {e}")))?;
        match parts.as_slice() {
            [x1, y1, x2, y2] => Ok(Self::new(*x1, *y1, *x2, *y2)),
            _ => Err(ImageError::InvalidArgument(format!(
                "invalid area '{s}': expected x1,y1,x2,y2"
            ))),
        }
    }
}

/// Read and decode an image, detecting the format from content.
pub(crate) fn load_image(path: &Path) -> ImageResult<DynamicImage> {
    if !path.exists() {
        tracing::error!("Input file not found: {}", path.display());
        return Err(ImageError::InputNotFound(path.to_path_buf()));
    }
    let decode_error = |message: String| ImageError::Decode {
        path: path.to_path_buf(),
        message,
    };
    let image = image::ImageReader::open(path)
        .map_err(|e| decode_error(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| decode_error(format!("Cannot detect image format: {e}")))?
        .decode()
        .map_err(|e| decode_error(e.to_string()))?;
    tracing::debug!(
        "Image read successfully: {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(image)
}

/// Encode `image` to `path`, creating parent directories.
///
/// Formats without an alpha channel get an RGB copy.
pub(crate) fn save_image(image: &DynamicImage, path: &Path) -> ImageResult<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ImageError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let opaque_only = matches!(
        ImageFormat::from_path(path),
        Ok(ImageFormat::Jpeg | ImageFormat::Pnm)
    );
    let result = if opaque_only && image.color().has_alpha() {
        DynamicImage::ImageRgb8(image.to_rgb8()).save(path)
    } else {
        image.save(path)
    };
    result.map_err(|e| ImageError::Encode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    tracing::info!("Image saved to: {}", path.display());
    Ok(path.to_path_buf())
}

/// `output` when given, else the input path with `_suffix` added to the stem.
pub fn output_path(input: &Path, output: Option<&Path>, suffix: &str) -> PathBuf {
    if let Some(output) = output {
        return output.to_path_buf();
    }
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let file_name = match input.extension() {
        Some(ext) => format!("{stem}_{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{suffix}"),
    };
    input.with_file_name(file_name)
}
