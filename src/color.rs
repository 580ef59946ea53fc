use palette::Srgb;

use crate::error::{ArtworkError, Result};

/// Snap a channel to the nearest multiple of `step`, rounding halves up.
///
/// The result never exceeds the largest multiple of `step` that fits in a
/// `u8`, so 255 lands on 250 with the default step.
#[inline]
pub fn snap_channel(value: u8, step: u8) -> u8 {
    let step = u16::from(step.max(1));
    let snapped = (u16::from(value) + step / 2) / step * step;
    let ceiling = 255 - 255 % step;
    snapped.min(ceiling) as u8
}

/// Coarse RGB key used to group similar pixel colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColorBucket([u8; 3]);

impl ColorBucket {
    pub fn from_rgb(r: u8, g: u8, b: u8, step: u8) -> Self {
        Self([
            snap_channel(r, step),
            snap_channel(g, step),
            snap_channel(b, step),
        ])
    }

    pub fn color(self) -> Srgb<u8> {
        let [r, g, b] = self.0;
        Srgb::new(r, g, b)
    }
}

/// `rgb(r, g, b)` notation.
pub fn to_css(color: Srgb<u8>) -> String {
    format!("rgb({}, {}, {})", color.red, color.green, color.blue)
}

pub fn to_hex(color: Srgb<u8>) -> String {
    format!("{:02X}{:02X}{:02X}", color.red, color.green, color.blue)
}

/// Parse either `#RRGGBB` / `RRGGBB` or `rgb(r, g, b)`.
pub fn parse_color(text: &str) -> Result<Srgb<u8>> {
    let text = text.trim();
    if let Some(inner) = text
        .strip_prefix("rgb(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let channels = inner
            .split(',')
            .map(|c| c.trim().parse::<u8>())
            .collect::<std::result::Result<Vec<u8>, _>>()
            .map_err(|_| ArtworkError::invalid(format!("invalid rgb() channel in {text:?}")))?;
        return match channels.as_slice() {
            &[r, g, b] => Ok(Srgb::new(r, g, b)),
            _ => Err(ArtworkError::invalid(format!(
                "rgb() needs three channels: {text:?}"
            ))),
        };
    }

    let hex = text.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(ArtworkError::invalid(format!(
            "hex color must be 6 characters: {text:?}"
        )));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .map_err(|_| ArtworkError::invalid(format!("invalid hex: {text:?}")))
    };
    Ok(Srgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
