//! Render a palette as stacked horizontal bands clipped to a shape.

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use image::{ImageFormat, Rgba, RgbaImage};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::{FALLBACK_RECT_HEIGHT, FALLBACK_WIDTH};
use crate::error::{ArtworkError, Result};
use crate::quantize::Palette;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    #[default]
    Square,
    Rectangle,
    Circle,
}

impl FromStr for Shape {
    type Err = ArtworkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "square" => Ok(Shape::Square),
            "rectangle" => Ok(Shape::Rectangle),
            "circle" => Ok(Shape::Circle),
            other => Err(ArtworkError::invalid(format!("unknown shape {other:?}"))),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Shape::Square => "square",
            Shape::Rectangle => "rectangle",
            Shape::Circle => "circle",
        })
    }
}

/// Everything needed to draw one artwork.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositionSpec {
    pub palette: Palette,
    pub shape: Shape,
    pub target_width: u32,
    pub target_height: u32,
    pub transparent_background: bool,
}

impl CompositionSpec {
    /// Take the target size from the source image, or fall back to 300x300
    /// (300x200 for rectangles) when the source size is unknown.
    pub fn from_source(
        palette: Palette,
        shape: Shape,
        source_dims: Option<(u32, u32)>,
        transparent_background: bool,
    ) -> Self {
        let (target_width, target_height) = source_dims.unwrap_or(match shape {
            Shape::Rectangle => (FALLBACK_WIDTH, FALLBACK_RECT_HEIGHT),
            Shape::Square | Shape::Circle => (FALLBACK_WIDTH, FALLBACK_WIDTH),
        });
        Self {
            palette,
            shape,
            target_width,
            target_height,
            transparent_background,
        }
    }

    /// Output dimensions for the chosen shape.
    pub fn canvas_size(&self) -> (u32, u32) {
        match self.shape {
            Shape::Square => (self.target_width, self.target_width),
            Shape::Rectangle => (self.target_width, self.target_height),
            Shape::Circle => {
                let side = self.target_width.min(self.target_height);
                (side, side)
            }
        }
    }
}

/// Rows `[start, end)` covered by band `index` out of `bands` on a canvas
/// `height` rows tall. Consecutive bands tile the height exactly.
pub fn band_rows(index: u32, bands: u32, height: u32) -> (u32, u32) {
    let edge = |i: u32| (u64::from(i) * u64::from(height) / u64::from(bands)) as u32;
    (edge(index), edge(index + 1))
}

/// Draw the artwork into an RGBA buffer.
pub fn render_artwork(spec: &CompositionSpec) -> Result<RgbaImage> {
    if spec.palette.is_empty() {
        return Err(ArtworkError::PreconditionFailed {
            reason: "palette is empty, nothing to draw",
        });
    }
    let (width, height) = spec.canvas_size();
    if width == 0 || height == 0 {
        return Err(ArtworkError::invalid(format!(
            "canvas must be at least 1x1, got {width}x{height}"
        )));
    }
    debug!(
        "rendering {} bands on {width}x{height} {} canvas",
        spec.palette.len(),
        spec.shape
    );

    let background = if spec.transparent_background { CLEAR } else { WHITE };
    let mut canvas = RgbaImage::from_pixel(width, height, background);

    let clip = match spec.shape {
        Shape::Circle => Some(CircleClip::inscribed(width, height)),
        Shape::Square | Shape::Rectangle => None,
    };

    let bands = spec.palette.len() as u32;
    for (index, entry) in spec.palette.iter().enumerate() {
        let fill = Rgba([entry.color.red, entry.color.green, entry.color.blue, 255]);
        let (start, end) = band_rows(index as u32, bands, height);
        for y in start..end {
            for x in 0..width {
                if clip.is_none_or(|c| c.contains(x, y)) {
                    canvas.put_pixel(x, y, fill);
                }
            }
        }
    }

    Ok(canvas)
}

/// Draw the artwork and encode it as PNG.
pub fn compose_artwork(spec: &CompositionSpec) -> Result<Vec<u8>> {
    let canvas = render_artwork(spec)?;
    encode_png(&canvas)
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(ArtworkError::Encode)?;
    Ok(buf)
}

/// Circle centred on the canvas with radius half its width. A pixel is
/// inside when its centre lies within the radius.
#[derive(Clone, Copy, Debug)]
struct CircleClip {
    cx: f64,
    cy: f64,
    radius_sq: f64,
}

impl CircleClip {
    fn inscribed(width: u32, height: u32) -> Self {
        let radius = f64::from(width) / 2.0;
        Self {
            cx: f64::from(width) / 2.0,
            cy: f64::from(height) / 2.0,
            radius_sq: radius * radius,
        }
    }

    #[inline]
    fn contains(&self, x: u32, y: u32) -> bool {
        let dx = f64::from(x) + 0.5 - self.cx;
        let dy = f64::from(y) + 0.5 - self.cy;
        dx * dx + dy * dy <= self.radius_sq
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palette::Srgb;

    fn two_tone() -> Palette {
        Palette::from_colors([Srgb::new(255, 0, 0), Srgb::new(0, 255, 0)])
    }

    fn spec(shape: Shape, w: u32, h: u32, transparent: bool) -> CompositionSpec {
        CompositionSpec {
            palette: two_tone(),
            shape,
            target_width: w,
            target_height: h,
            transparent_background: transparent,
        }
    }

    #[test]
    fn canvas_size_follows_shape() {
        assert_eq!(spec(Shape::Square, 300, 120, false).canvas_size(), (300, 300));
        assert_eq!(spec(Shape::Rectangle, 300, 120, false).canvas_size(), (300, 120));
        assert_eq!(spec(Shape::Circle, 300, 200, false).canvas_size(), (200, 200));
        assert_eq!(spec(Shape::Circle, 90, 200, false).canvas_size(), (90, 90));
    }

    #[test]
    fn fallback_sizes_without_source() {
        let rect = CompositionSpec::from_source(two_tone(), Shape::Rectangle, None, false);
        assert_eq!(rect.canvas_size(), (300, 200));
        let circle = CompositionSpec::from_source(two_tone(), Shape::Circle, None, false);
        assert_eq!(circle.canvas_size(), (300, 300));
        let sourced =
            CompositionSpec::from_source(two_tone(), Shape::Circle, Some((640, 480)), true);
        assert_eq!(sourced.canvas_size(), (480, 480));
    }

    #[test]
    fn partial_source_size_uses_fallback() {
        let dims = Some(640u32).zip(None::<u32>);
        let rect = CompositionSpec::from_source(two_tone(), Shape::Rectangle, dims, false);
        assert_eq!(rect.canvas_size(), (300, 200));
    }

    #[test]
    fn bands_tile_uneven_heights() {
        let (bands, height) = (3, 100);
        let mut next = 0;
        for i in 0..bands {
            let (start, end) = band_rows(i, bands, height);
            assert_eq!(start, next);
            assert!(end - start == 33 || end - start == 34);
            next = end;
        }
        assert_eq!(next, height);
    }

    #[test]
    fn empty_palette_is_a_precondition_failure() {
        let mut s = spec(Shape::Square, 10, 10, false);
        s.palette = Palette::default();
        assert!(matches!(
            compose_artwork(&s),
            Err(ArtworkError::PreconditionFailed { .. })
        ));
    }

    #[test]
    fn zero_sized_canvas_is_invalid() {
        let s = spec(Shape::Rectangle, 10, 0, false);
        assert!(matches!(
            render_artwork(&s),
            Err(ArtworkError::InvalidInput { .. })
        ));
    }

    #[test]
    fn circle_corners_keep_transparent_background() {
        let img = render_artwork(&spec(Shape::Circle, 40, 40, true)).unwrap();
        assert_eq!(*img.get_pixel(0, 0), CLEAR);
        assert_eq!(*img.get_pixel(39, 39), CLEAR);
        assert_eq!(*img.get_pixel(20, 5), Rgba([255, 0, 0, 255]));
        assert_eq!(*img.get_pixel(20, 35), Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn shape_parses_case_insensitively() {
        assert_eq!("Circle".parse::<Shape>().unwrap(), Shape::Circle);
        assert_eq!(" rectangle ".parse::<Shape>().unwrap(), Shape::Rectangle);
        assert!("triangle".parse::<Shape>().is_err());
        assert_eq!(Shape::Square.to_string(), "square");
    }
}
