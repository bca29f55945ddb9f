//! Circles, lines, and arrows. Shapes may extend past the image edges and
//! are clipped while drawing.

use image::{DynamicImage, Rgba, RgbaImage};
use std::path::{Path, PathBuf};

use super::{load_image, output_path, save_image, ImageTools};
use crate::error::{ImageError, ImageResult};

const DEFAULT_TIP_LENGTH: f64 = 0.1;

/// A circle. Unset colour and thickness fall back to the `drawing` section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleSpec {
    pub center: (i32, i32),
    pub radius: u32,
    pub color: Option<[u8; 3]>,
    pub thickness: Option<u32>,
    pub filled: bool,
}

impl CircleSpec {
    pub fn new(center: (i32, i32), radius: u32) -> Self {
        Self {
            center,
            radius,
            color: None,
            thickness: None,
            filled: false,
        }
    }
}

/// A straight segment, optionally ending in an arrow head.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSpec {
    pub start: (i32, i32),
    pub end: (i32, i32),
    pub color: Option<[u8; 3]>,
    pub thickness: Option<u32>,
    /// Arrow head length as a fraction of the segment length
    pub tip_length: Option<f64>,
}

impl LineSpec {
    pub fn new(start: (i32, i32), end: (i32, i32)) -> Self {
        Self {
            start,
            end,
            color: None,
            thickness: None,
            tip_length: None,
        }
    }
}

fn parse_coords(raw: &str, expected: usize, shape: &str) -> ImageResult<Vec<i32>> {
    let parts = raw
        .split(',')
        .map(|p| p.trim().parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ImageError::InvalidArgument(format!("invalid {shape} '{raw}': {e}")))?;
    if parts.len() != expected {
        return Err(ImageError::InvalidArgument(format!(
            "invalid {shape} '{raw}': expected {expected} comma-separated integers"
        )));
    }
    Ok(parts)
}

/// Parse an `x,y` point.
pub fn parse_point(raw: &str) -> ImageResult<(i32, i32)> {
    let p = parse_coords(raw, 2, "point")?;
    Ok((p[0], p[1]))
}

/// Parse an `x1,y1,x2,y2` segment.
pub fn parse_segment(raw: &str) -> ImageResult<LineSpec> {
    let p = parse_coords(raw, 4, "segment")?;
    Ok(LineSpec::new((p[0], p[1]), (p[2], p[3])))
}

impl ImageTools {
    /// Draw circles, outlined inward by `thickness` unless `filled`.
    pub fn draw_circles(
        &self,
        input: &Path,
        circles: &[CircleSpec],
        output: Option<&Path>,
    ) -> ImageResult<PathBuf> {
        let mut canvas = load_image(input)?.to_rgba8();
        for circle in circles {
            let color = self.stroke_color(circle.color);
            let thickness = circle.thickness.unwrap_or(self.drawing.thickness).max(1);
            let inner = if circle.filled {
                None
            } else {
                Some(i64::from(circle.radius).saturating_sub(i64::from(thickness)))
            };
            fill_ring(&mut canvas, circle.center, circle.radius.into(), inner, color);
        }

        tracing::info!("Drew {} circle(s) on {}", circles.len(), input.display());
        save_image(
            &DynamicImage::ImageRgba8(canvas),
            &output_path(input, output, "with_circles"),
        )
    }

    /// Draw straight lines. `tip_length` is ignored.
    pub fn draw_lines(
        &self,
        input: &Path,
        lines: &[LineSpec],
        output: Option<&Path>,
    ) -> ImageResult<PathBuf> {
        let mut canvas = load_image(input)?.to_rgba8();
        for line in lines {
            let color = self.stroke_color(line.color);
            let thickness = line.thickness.unwrap_or(self.drawing.thickness).max(1);
            stroke(&mut canvas, line.start, line.end, thickness, color);
        }

        tracing::info!("Drew {} line(s) on {}", lines.len(), input.display());
        save_image(
            &DynamicImage::ImageRgba8(canvas),
            &output_path(input, output, "with_lines"),
        )
    }

    /// Draw lines with an arrow head at `end`.
    pub fn draw_arrows(
        &self,
        input: &Path,
        arrows: &[LineSpec],
        output: Option<&Path>,
    ) -> ImageResult<PathBuf> {
        let mut canvas = load_image(input)?.to_rgba8();
        for arrow in arrows {
            let color = self.stroke_color(arrow.color);
            let thickness = arrow.thickness.unwrap_or(self.drawing.thickness).max(1);
            stroke(&mut canvas, arrow.start, arrow.end, thickness, color);
            let tip = arrow.tip_length.unwrap_or(DEFAULT_TIP_LENGTH);
            for barb in arrow_barbs(arrow.start, arrow.end, tip) {
                stroke(&mut canvas, arrow.end, barb, thickness, color);
            }
        }

        tracing::info!("Drew {} arrow(s) on {}", arrows.len(), input.display());
        save_image(
            &DynamicImage::ImageRgba8(canvas),
            &output_path(input, output, "with_arrows"),
        )
    }

    fn stroke_color(&self, color: Option<[u8; 3]>) -> Rgba<u8> {
        let [b, g, r] = color.unwrap_or(self.drawing.color);
        Rgba([r, g, b, 255])
    }
}

/// Paint pixels whose distance from `center` is at most `outer` and, when
/// `inner` is set, greater than `inner`.
fn fill_ring(
    canvas: &mut RgbaImage,
    (cx, cy): (i32, i32),
    outer: i64,
    inner: Option<i64>,
    color: Rgba<u8>,
) {
    let (width, height) = canvas.dimensions();
    let (cx, cy) = (i64::from(cx), i64::from(cy));
    let x_range = (cx - outer).max(0)..=(cx + outer).min(i64::from(width) - 1);
    let y_range = (cy - outer).max(0)..=(cy + outer).min(i64::from(height) - 1);

    for y in y_range {
        for x in x_range.clone() {
            let d2 = i128::from(x - cx).pow(2) + i128::from(y - cy).pow(2);
            let inside = d2 <= i128::from(outer).pow(2);
            let outside_hole = inner.map_or(true, |r| r < 0 || d2 > i128::from(r).pow(2));
            if inside && outside_hole {
                canvas.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

/// Bresenham walk from `start` to `end`, stamping a disc per step.
fn stroke(
    canvas: &mut RgbaImage,
    start: (i32, i32),
    end: (i32, i32),
    thickness: u32,
    color: Rgba<u8>,
) {
    let radius = i64::from(thickness / 2);
    let (mut x, mut y) = (i64::from(start.0), i64::from(start.1));
    let (x1, y1) = (i64::from(end.0), i64::from(end.1));
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        fill_ring(canvas, (x as i32, y as i32), radius, None, color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// End points of the two head strokes, 45 degrees either side of the shaft.
fn arrow_barbs(start: (i32, i32), end: (i32, i32), tip_length: f64) -> [(i32, i32); 2] {
    let (dx, dy) = (
        f64::from(start.0) - f64::from(end.0),
        f64::from(start.1) - f64::from(end.1),
    );
    let length = dx.hypot(dy) * tip_length;
    let angle = dy.atan2(dx);
    let quarter = std::f64::consts::FRAC_PI_4;
    [angle + quarter, angle - quarter].map(|a| {
        (
            (f64::from(end.0) + length * a.cos()).round() as i32,
            (f64::from(end.1) + length * a.sin()).round() as i32,
        )
    })
}
