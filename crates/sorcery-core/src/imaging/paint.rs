//! Operations that paint over pixels: blur, rectangle outlines, area fills.
//!
//! Colours are given in BGR order, matching `drawing.color`.

use image::{imageops, DynamicImage, GenericImageView, Rgba, RgbaImage};
use std::path::{Path, PathBuf};

use super::{load_image, output_path, save_image, Area, ImageTools};
use crate::error::{ImageError, ImageResult};

const DEFAULT_FILL_OPACITY: f32 = 0.5;

/// One region to blur. `strength` falls back to `blur.strength`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlurArea {
    pub area: Area,
    pub strength: Option<u32>,
}

/// One rectangle to draw. Unset fields fall back to the `drawing` section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectangleSpec {
    pub area: Area,
    pub color: Option<[u8; 3]>,
    pub thickness: Option<u32>,
    pub filled: bool,
}

impl RectangleSpec {
    pub fn outline(area: Area) -> Self {
        Self {
            area,
            color: None,
            thickness: None,
            filled: false,
        }
    }
}

/// One region to fill. `color` falls back to `drawing.color`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillArea {
    pub area: Area,
    pub color: Option<[u8; 3]>,
    pub opacity: Option<f32>,
    /// Clear the region to full transparency instead of painting it
    pub transparent: bool,
}

impl FillArea {
    pub fn new(area: Area) -> Self {
        Self {
            area,
            color: None,
            opacity: None,
            transparent: false,
        }
    }
}

/// Parse a `b,g,r` triple.
pub fn parse_color(raw: &str) -> ImageResult<[u8; 3]> {
    let parts = raw
        .split(',')
        .map(|p| p.trim().parse::<u8>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ImageError::InvalidArgument(format!("invalid color '{raw}': {e}")))?;
    match parts.as_slice() {
        [b, g, r] => Ok([*b, *g, *r]),
        _ => Err(ImageError::InvalidArgument(format!(
            "invalid color '{raw}': expected b,g,r"
        ))),
    }
}

fn bgr_to_rgba([b, g, r]: [u8; 3], alpha: u8) -> Rgba<u8> {
    Rgba([r, g, b, alpha])
}

/// Gaussian sigma equivalent to a square kernel of `kernel` pixels.
fn sigma_for_kernel(kernel: u32) -> f32 {
    0.3 * ((kernel as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

fn odd_strength(strength: u32) -> u32 {
    if strength % 2 == 0 {
        let adjusted = strength + 1;
        tracing::warn!("Blur strength {strength} is even, using {adjusted}");
        adjusted
    } else {
        strength
    }
}

impl ImageTools {
    /// Blur each area in place.
    pub fn blur(
        &self,
        input: &Path,
        areas: &[BlurArea],
        output: Option<&Path>,
    ) -> ImageResult<PathBuf> {
        if areas.is_empty() {
            return Err(ImageError::InvalidArgument(
                "at least one blur area is required".into(),
            ));
        }
        let mut image = load_image(input)?;
        let (width, height) = image.dimensions();

        for spec in areas {
            let strength = odd_strength(spec.strength.unwrap_or(self.blur.strength));
            let (x, y, w, h) = spec.area.clip(width, height)?;
            let region = image.crop_imm(x, y, w, h);
            let blurred = imageops::blur(&region, sigma_for_kernel(strength));
            imageops::replace(&mut image, &blurred, x as i64, y as i64);
            tracing::debug!("Blurred {w}x{h} region at ({x}, {y}) with strength {strength}");
        }

        tracing::info!("Blurred {} area(s) in {}", areas.len(), input.display());
        save_image(&image, &output_path(input, output, "blurred"))
    }

    /// Draw rectangles, outlined inward by `thickness` unless `filled`.
    pub fn draw_rectangles(
        &self,
        input: &Path,
        rectangles: &[RectangleSpec],
        output: Option<&Path>,
    ) -> ImageResult<PathBuf> {
        let mut canvas = load_image(input)?.to_rgba8();
        let (width, height) = canvas.dimensions();

        for rect in rectangles {
            let color = bgr_to_rgba(rect.color.unwrap_or(self.drawing.color), 255);
            let (x, y, w, h) = rect.area.clip(width, height)?;
            let thickness = rect
                .thickness
                .unwrap_or(self.drawing.thickness)
                .clamp(1, w.max(h));
            for py in y..y + h {
                for px in x..x + w {
                    let on_edge = px - x < thickness
                        || py - y < thickness
                        || x + w - px <= thickness
                        || y + h - py <= thickness;
                    if rect.filled || on_edge {
                        canvas.put_pixel(px, py, color);
                    }
                }
            }
        }

        tracing::info!(
            "Drew {} rectangle(s) on {}",
            rectangles.len(),
            input.display()
        );
        save_image(
            &DynamicImage::ImageRgba8(canvas),
            &output_path(input, output, "with_rectangles"),
        )
    }

    /// Fill areas with a colour blended at `opacity`, or clear them to
    /// transparent.
    ///
    /// With `invert`, everything outside the areas is filled instead, using
    /// the first area's colour and opacity.
    pub fn fill(
        &self,
        input: &Path,
        areas: &[FillArea],
        invert: bool,
        output: Option<&Path>,
    ) -> ImageResult<PathBuf> {
        let mut canvas = load_image(input)?.to_rgba8();
        let (width, height) = canvas.dimensions();
        for area in areas {
            area.area.clip(width, height)?;
        }

        if invert {
            let template = areas
                .first()
                .copied()
                .unwrap_or_else(|| FillArea::new(Area::new(0, 0, 0, 0)));
            let paint = self.fill_paint(&template);
            let opacity = clamp_opacity(template.opacity);
            for (px, py, pixel) in canvas.enumerate_pixels_mut() {
                if !areas.iter().any(|a| a.area.contains(px, py)) {
                    *pixel = paint_pixel(*pixel, paint, opacity);
                }
            }
        } else {
            for area in areas {
                let opacity = clamp_opacity(area.opacity);
                paint_region(&mut canvas, area.area, self.fill_paint(area), opacity);
            }
        }

        tracing::info!(
            "Filled {} area(s){} in {}",
            areas.len(),
            if invert { " (inverted)" } else { "" },
            input.display()
        );
        save_image(
            &DynamicImage::ImageRgba8(canvas),
            &output_path(input, output, "filled"),
        )
    }
}

impl ImageTools {
    /// `None` means clear to transparent.
    fn fill_paint(&self, area: &FillArea) -> Option<[u8; 3]> {
        if area.transparent {
            None
        } else {
            Some(area.color.unwrap_or(self.drawing.color))
        }
    }
}

fn clamp_opacity(opacity: Option<f32>) -> f32 {
    let opacity = opacity.unwrap_or(DEFAULT_FILL_OPACITY);
    if !(0.0..=1.0).contains(&opacity) {
        let clamped = opacity.clamp(0.0, 1.0);
        tracing::warn!("Fill opacity {opacity} out of range, using {clamped}");
        return clamped;
    }
    opacity
}

fn paint_region(canvas: &mut RgbaImage, area: Area, color: Option<[u8; 3]>, opacity: f32) {
    let (width, height) = canvas.dimensions();
    for py in area.y1.min(height)..area.y2.min(height) {
        for px in area.x1.min(width)..area.x2.min(width) {
            let pixel = *canvas.get_pixel(px, py);
            canvas.put_pixel(px, py, paint_pixel(pixel, color, opacity));
        }
    }
}

fn paint_pixel(pixel: Rgba<u8>, color: Option<[u8; 3]>, opacity: f32) -> Rgba<u8> {
    let Some(color) = color else {
        let Rgba([r, g, b, _]) = pixel;
        return Rgba([r, g, b, 0]);
    };
    let Rgba([fr, fg, fb, _]) = bgr_to_rgba(color, 255);
    let blend = |old: u8, new: u8| {
        (old as f32 * (1.0 - opacity) + new as f32 * opacity).round() as u8
    };
    Rgba([
        blend(pixel[0], fr),
        blend(pixel[1], fg),
        blend(pixel[2], fb),
        pixel[3],
    ])
}
