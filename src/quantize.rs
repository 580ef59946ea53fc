//! Frequency-ranked palette extraction.
//!
//! Pixels are sampled at a fixed stride, translucent samples are dropped,
//! the survivors are snapped to a coarse RGB grid and the most common
//! buckets become the palette.

use std::collections::HashMap;
use std::fmt;

use image::RgbaImage;
use log::debug;
use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::color::{self, ColorBucket};
use crate::config::QuantizeConfig;
use crate::error::{ArtworkError, Result};

/// Borrowed view over decoded RGBA8 pixels.
#[derive(Clone, Copy, Debug)]
pub struct PixelBuffer<'a> {
    width: u32,
    height: u32,
    data: &'a [u8],
}

impl<'a> PixelBuffer<'a> {
    /// Wrap raw RGBA bytes. `data` must hold exactly `width * height * 4` bytes.
    pub fn new(width: u32, height: u32, data: &'a [u8]) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| {
                ArtworkError::invalid(format!("dimensions {width}x{height} are too large"))
            })?;
        if data.len() != expected {
            return Err(ArtworkError::invalid(format!(
                "pixel buffer length {} does not match dimensions {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn from_image(img: &'a RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.as_raw(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// One palette color and its share of the image, in percent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub color: Srgb<u8>,
    pub weight: f64,
}

impl PaletteEntry {
    pub fn css(&self) -> String {
        color::to_css(self.color)
    }

    pub fn hex(&self) -> String {
        color::to_hex(self.color)
    }

    /// Weight with exactly two decimals, e.g. `"3.50"`.
    pub fn percentage(&self) -> String {
        format!("{:.2}", self.weight)
    }
}

impl fmt::Display for PaletteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}%", self.css(), self.percentage())
    }
}

/// Ordered list of palette entries.
///
/// Extraction yields most-frequent-first order; afterwards callers may
/// reorder freely and the order is what the compositor draws top to bottom.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette(Vec<PaletteEntry>);

impl Palette {
    pub fn new(entries: Vec<PaletteEntry>) -> Self {
        Self(entries)
    }

    /// Palette of bare colors, all with zero weight.
    pub fn from_colors(colors: impl IntoIterator<Item = Srgb<u8>>) -> Self {
        Self(
            colors
                .into_iter()
                .map(|color| PaletteEntry { color, weight: 0.0 })
                .collect(),
        )
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PaletteEntry> {
        self.0.iter()
    }

    pub fn colors(&self) -> impl Iterator<Item = Srgb<u8>> + '_ {
        self.0.iter().map(|e| e.color)
    }

    /// Move the entry at `from` so it ends up at index `to`, shifting the
    /// entries in between. Out-of-range indices leave the palette untouched.
    pub fn move_entry(&mut self, from: usize, to: usize) {
        if from == to || from >= self.0.len() || to >= self.0.len() {
            return;
        }
        let entry = self.0.remove(from);
        self.0.insert(to, entry);
    }

    /// Rearrange entries so that position `i` holds the entry previously at
    /// `order[i]`. `order` must be a permutation of `0..len`.
    pub fn reorder(&mut self, order: &[usize]) -> Result<()> {
        let mut seen = vec![false; self.0.len()];
        if order.len() != self.0.len() {
            return Err(ArtworkError::invalid(format!(
                "order has {} indices for {} entries",
                order.len(),
                self.0.len()
            )));
        }
        for &i in order {
            match seen.get_mut(i) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(ArtworkError::invalid(format!(
                        "order is not a permutation: {order:?}"
                    )));
                }
            }
        }
        self.0 = order.iter().map(|&i| self.0[i]).collect();
        Ok(())
    }
}

impl From<Vec<PaletteEntry>> for Palette {
    fn from(entries: Vec<PaletteEntry>) -> Self {
        Self(entries)
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a PaletteEntry;
    type IntoIter = std::slice::Iter<'a, PaletteEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Extract up to `color_count` dominant colors, sampling every 10th pixel,
/// skipping alpha below 128 and snapping channels to multiples of 10.
///
/// `color_count` is expected to already be clamped to `[2, 10]`; see
/// [`crate::config::clamp_color_count`].
pub fn extract_palette(buffer: &PixelBuffer<'_>, color_count: usize) -> Result<Palette> {
    extract_palette_with(buffer, color_count, &QuantizeConfig::default())
}

/// Extract up to `color_count` dominant colors.
///
/// Occurrences are counted over the sampled pixels only while weights are
/// divided by the full pixel count, so weights shrink with the sampling
/// stride and never add up to 100.
pub(crate) fn extract_palette_with(
    buffer: &PixelBuffer<'_>,
    color_count: usize,
    config: &QuantizeConfig,
) -> Result<Palette> {
    let total_pixels = buffer.pixel_count();
    if total_pixels == 0 {
        return Err(ArtworkError::invalid("pixel buffer has no pixels"));
    }

    // Buckets in first-seen order; `slots` maps a bucket to its position.
    let mut counts: Vec<(ColorBucket, u32)> = Vec::new();
    let mut slots: HashMap<ColorBucket, usize> = HashMap::new();
    let mut sampled = 0usize;

    for px in buffer.data.chunks_exact(4).step_by(config.sample_stride) {
        sampled += 1;
        if px[3] < config.alpha_threshold {
            continue;
        }
        let bucket = ColorBucket::from_rgb(px[0], px[1], px[2], config.quant_step);
        match slots.get(&bucket) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                slots.insert(bucket, counts.len());
                counts.push((bucket, 1));
            }
        }
    }

    debug!(
        "sampled {sampled} of {total_pixels} pixels into {} buckets",
        counts.len()
    );

    // Stable: equal counts keep first-seen order.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(color_count);

    let entries = counts
        .into_iter()
        .map(|(bucket, count)| PaletteEntry {
            color: bucket.color(),
            weight: round_percent(count as f64 / total_pixels as f64 * 100.0),
        })
        .collect();

    Ok(Palette(entries))
}

fn round_percent(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        rgba.repeat(width as usize * height as usize)
    }

    #[test]
    fn length_mismatch_is_invalid_input() {
        let data = vec![0u8; 7];
        assert!(matches!(
            PixelBuffer::new(2, 1, &data),
            Err(ArtworkError::InvalidInput { .. })
        ));
    }

    #[test]
    fn oversized_dimensions_are_invalid_input() {
        assert!(matches!(
            PixelBuffer::new(u32::MAX, u32::MAX, &[]),
            Err(ArtworkError::InvalidInput { .. })
        ));
    }

    #[test]
    fn empty_buffer_is_invalid_input() {
        let buffer = PixelBuffer::new(0, 5, &[]).unwrap();
        assert!(matches!(
            extract_palette(&buffer, 5),
            Err(ArtworkError::InvalidInput { .. })
        ));
    }

    #[test]
    fn samples_every_tenth_pixel() {
        // 20 pixels, only indices 0 and 10 are sampled.
        let mut data = solid(20, 1, [0, 0, 255, 255]);
        data[0..4].copy_from_slice(&[255, 0, 0, 255]);
        data[40..44].copy_from_slice(&[0, 255, 0, 255]);
        let buffer = PixelBuffer::new(20, 1, &data).unwrap();

        let palette = extract_palette(&buffer, 5).unwrap();
        let colors: Vec<_> = palette.colors().collect();
        assert_eq!(colors, vec![Srgb::new(250, 0, 0), Srgb::new(0, 250, 0)]);
        // 1 sample out of 20 pixels.
        assert_eq!(palette.entries()[0].weight, 5.0);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let mut data = Vec::new();
        for rgb in [[0, 0, 200], [200, 0, 0], [0, 200, 0]] {
            data.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
        }
        let buffer = PixelBuffer::new(3, 1, &data).unwrap();
        let config = QuantizeConfig {
            sample_stride: 1,
            ..QuantizeConfig::default()
        };

        let palette = extract_palette_with(&buffer, 10, &config).unwrap();
        let colors: Vec<_> = palette.colors().collect();
        assert_eq!(
            colors,
            vec![Srgb::new(0, 0, 200), Srgb::new(200, 0, 0), Srgb::new(0, 200, 0)]
        );
    }

    #[test]
    fn alpha_threshold_is_exclusive() {
        let mut data = solid(2, 1, [10, 10, 10, 127]);
        data[4..8].copy_from_slice(&[90, 90, 90, 128]);
        let buffer = PixelBuffer::new(2, 1, &data).unwrap();
        let config = QuantizeConfig {
            sample_stride: 1,
            ..QuantizeConfig::default()
        };

        let palette = extract_palette_with(&buffer, 2, &config).unwrap();
        assert_eq!(palette.len(), 1);
        assert_eq!(palette.entries()[0].color, Srgb::new(90, 90, 90));
        assert_eq!(palette.entries()[0].percentage(), "50.00");
    }

    #[test]
    fn weights_round_to_two_decimals() {
        // 3 pixels, all sampled, one bucket with 1/3 share.
        let mut data = solid(3, 1, [0, 0, 0, 0]);
        data[0..4].copy_from_slice(&[40, 40, 40, 255]);
        let buffer = PixelBuffer::new(3, 1, &data).unwrap();
        let config = QuantizeConfig {
            sample_stride: 1,
            ..QuantizeConfig::default()
        };

        let palette = extract_palette_with(&buffer, 2, &config).unwrap();
        assert_eq!(palette.entries()[0].weight, 33.33);
    }

    #[test]
    fn move_entry_shifts_neighbours() {
        let mut palette = Palette::from_colors([
            Srgb::new(1, 0, 0),
            Srgb::new(2, 0, 0),
            Srgb::new(3, 0, 0),
        ]);
        palette.move_entry(0, 2);
        let reds: Vec<u8> = palette.colors().map(|c| c.red).collect();
        assert_eq!(reds, vec![2, 3, 1]);

        palette.move_entry(5, 0);
        let reds: Vec<u8> = palette.colors().map(|c| c.red).collect();
        assert_eq!(reds, vec![2, 3, 1]);
    }

    #[test]
    fn reorder_requires_a_permutation() {
        let mut palette = Palette::from_colors([Srgb::new(1, 0, 0), Srgb::new(2, 0, 0)]);
        assert!(palette.reorder(&[0, 0]).is_err());
        assert!(palette.reorder(&[1]).is_err());
        palette.reorder(&[1, 0]).unwrap();
        assert_eq!(palette.entries()[0].color, Srgb::new(2, 0, 0));
    }

    #[test]
    fn display_matches_css_and_percentage() {
        let entry = PaletteEntry {
            color: Srgb::new(250, 0, 0),
            weight: 3.5,
        };
        assert_eq!(entry.to_string(), "rgb(250, 0, 0) 3.50%");
    }
}
