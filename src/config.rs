//! Fixed quantizer constants and fallback canvas sizes for the compositor.

/// Smallest palette a caller may request.
pub const MIN_COLORS: usize = 2;
/// Largest palette a caller may request.
pub const MAX_COLORS: usize = 10;
pub const DEFAULT_COLORS: usize = 5;

/// Bucket width per channel.
pub const QUANT_STEP: u8 = 10;
/// Samples with alpha strictly below this are skipped.
pub const ALPHA_THRESHOLD: u8 = 128;
/// Distance in pixels between two consecutive samples.
pub const SAMPLE_STRIDE: usize = 10;

/// File name used when the exported artwork is saved.
pub const DEFAULT_EXPORT_NAME: &str = "artwork.png";

/// Canvas edge used when no source dimensions are available.
pub const FALLBACK_WIDTH: u32 = 300;
/// Rectangle height used when no source dimensions are available.
pub const FALLBACK_RECT_HEIGHT: u32 = 200;

/// Clamp a requested color count into `[MIN_COLORS, MAX_COLORS]`.
pub fn clamp_color_count(requested: usize) -> usize {
    requested.clamp(MIN_COLORS, MAX_COLORS)
}

/// Sampling parameters used by the quantizer. Only the defaults are
/// reachable from the public API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct QuantizeConfig {
    pub quant_step: u8,
    pub alpha_threshold: u8,
    pub sample_stride: usize,
}

impl Default for QuantizeConfig {
    fn default() -> Self {
        Self {
            quant_step: QUANT_STEP,
            alpha_threshold: ALPHA_THRESHOLD,
            sample_stride: SAMPLE_STRIDE,
        }
    }
}
