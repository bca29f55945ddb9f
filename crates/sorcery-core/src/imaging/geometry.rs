//! Crop, resize, and rotate.

use image::imageops::FilterType;
use image::GenericImageView;
use std::path::{Path, PathBuf};

use super::{load_image, output_path, save_image, Area, ImageTools};
use crate::config::Interpolation;
use crate::error::{ImageError, ImageResult};

/// Target size for [`ImageTools::resize`].
///
/// `scale_factor` wins over explicit dimensions. With only one of `width`
/// or `height`, the other follows the aspect ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResizeRequest {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub scale_factor: Option<f64>,
    /// Falls back to `resize.interpolation`
    pub interpolation: Option<Interpolation>,
}

impl ResizeRequest {
    fn target(&self, width: u32, height: u32) -> ImageResult<(u32, u32)> {
        let (w, h) = match (self.scale_factor, self.width, self.height) {
            (Some(scale), _, _) => {
                if !(scale > 0.0) {
                    return Err(ImageError::InvalidArgument(format!(
                        "scale_factor must be positive (got {scale})"
                    )));
                }
                (
                    (width as f64 * scale) as u32,
                    (height as f64 * scale) as u32,
                )
            }
            (None, Some(w), Some(h)) => (w, h),
            (None, Some(w), None) => (w, (height as f64 * (w as f64 / width as f64)) as u32),
            (None, None, Some(h)) => ((width as f64 * (h as f64 / height as f64)) as u32, h),
            (None, None, None) => {
                return Err(ImageError::InvalidArgument(
                    "Either width, height, or scale_factor must be provided".into(),
                ))
            }
        };
        if w == 0 || h == 0 {
            return Err(ImageError::InvalidArgument(format!(
                "target size {w}x{h} is empty"
            )));
        }
        Ok((w, h))
    }
}

/// Resampling filter used for an interpolation mode.
pub fn filter_for(interpolation: Interpolation) -> FilterType {
    match interpolation {
        Interpolation::Nearest => FilterType::Nearest,
        Interpolation::Linear => FilterType::Triangle,
        Interpolation::Area => FilterType::Gaussian,
        Interpolation::Cubic => FilterType::CatmullRom,
        Interpolation::Lanczos => FilterType::Lanczos3,
    }
}

impl ImageTools {
    /// Cut `area` out of the image.
    pub fn crop(&self, input: &Path, area: Area, output: Option<&Path>) -> ImageResult<PathBuf> {
        tracing::info!("Crop requested for {} with {area:?}", input.display());
        let image = load_image(input)?;
        let (x, y, w, h) = area.clip(image.width(), image.height())?;
        let cropped = image.crop_imm(x, y, w, h);
        save_image(&cropped, &output_path(input, output, "cropped"))
    }

    /// Resize to the size described by `request`.
    pub fn resize(
        &self,
        input: &Path,
        request: ResizeRequest,
        output: Option<&Path>,
    ) -> ImageResult<PathBuf> {
        let interpolation = request.interpolation.unwrap_or(self.resize.interpolation);
        let image = load_image(input)?;
        let (orig_w, orig_h) = image.dimensions();
        let (w, h) = request.target(orig_w, orig_h)?;

        tracing::info!(
            "Resizing {} from {orig_w}x{orig_h} to {w}x{h} ({interpolation})",
            input.display()
        );
        let resized = image.resize_exact(w, h, filter_for(interpolation));
        save_image(&resized, &output_path(input, output, "resized"))
    }

    /// Rotate by `angle` degrees, positive meaning counter-clockwise.
    ///
    /// Only multiples of 90 degrees are supported, so no pixels are lost.
    pub fn rotate(&self, input: &Path, angle: f64, output: Option<&Path>) -> ImageResult<PathBuf> {
        let normalized = angle.rem_euclid(360.0);
        if normalized % 90.0 != 0.0 {
            return Err(ImageError::InvalidArgument(format!(
                "rotation angle must be a multiple of 90 degrees (got {angle})"
            )));
        }

        tracing::info!("Rotating {} by {angle} degrees", input.display());
        let image = load_image(input)?;
        let rotated = match normalized as u32 {
            90 => image.rotate270(),
            180 => image.rotate180(),
            270 => image.rotate90(),
            _ => image,
        };
        save_image(&rotated, &output_path(input, output, "rotated"))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::solid_png;
    use super::*;
    use crate::config::Config;
    use image::Rgb;

    fn tools() -> ImageTools {
        ImageTools::new(&Config::default())
    }

    #[test]
    fn test_crop() {
        let dir = tempfile::tempdir().unwrap();
        let input = solid_png(dir.path(), "in.png", 100, 80, [0, 0, 0]);

        let out = tools().crop(&input, Area::new(10, 10, 60, 30), None).unwrap();
        assert_eq!(out, dir.path().join("in_cropped.png"));
        let cropped = image::open(&out).unwrap();
        assert_eq!(cropped.dimensions(), (50, 20));
    }

    #[test]
    fn test_resize_targets() {
        let keep_ratio = ResizeRequest {
            width: Some(50),
            ..Default::default()
        };
        assert_eq!(keep_ratio.target(100, 80).unwrap(), (50, 40));

        let scaled = ResizeRequest {
            width: Some(10),
            scale_factor: Some(2.0),
            ..Default::default()
        };
        assert_eq!(scaled.target(100, 80).unwrap(), (200, 160));

        assert!(ResizeRequest::default().target(100, 80).is_err());
        let negative = ResizeRequest {
            scale_factor: Some(-1.0),
            ..Default::default()
        };
        assert!(negative.target(100, 80).is_err());
    }

    #[test]
    fn test_resize_uses_configured_interpolation() {
        let dir = tempfile::tempdir().unwrap();
        let input = solid_png(dir.path(), "in.png", 40, 20, [9, 9, 9]);

        let mut config = Config::default();
        config.resize.interpolation = Interpolation::Nearest;
        let request = ResizeRequest {
            height: Some(10),
            ..Default::default()
        };
        let out = ImageTools::new(&config).resize(&input, request, None).unwrap();

        let resized = image::open(&out).unwrap().to_rgb8();
        assert_eq!(resized.dimensions(), (20, 10));
        assert_eq!(resized.get_pixel(5, 5), &Rgb([9, 9, 9]));
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let dir = tempfile::tempdir().unwrap();
        let input = solid_png(dir.path(), "in.png", 30, 10, [0, 0, 0]);

        let out = tools().rotate(&input, 90.0, None).unwrap();
        assert_eq!(image::open(&out).unwrap().dimensions(), (10, 30));

        let out = tools().rotate(&input, -180.0, None).unwrap();
        assert_eq!(image::open(&out).unwrap().dimensions(), (30, 10));

        assert!(tools().rotate(&input, 45.0, None).is_err());
    }

    #[test]
    fn test_interpolation_filters() {
        assert_eq!(filter_for(Interpolation::Nearest), FilterType::Nearest);
        assert_eq!(filter_for(Interpolation::Lanczos), FilterType::Lanczos3);
    }
}
