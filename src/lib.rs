//! Dominant-color palette extraction and palette artwork rendering.
//!
//! The pipeline has two independent stages:
//! 1. [`extract_palette`] samples a decoded RGBA buffer and ranks coarse
//!    color buckets by frequency.
//! 2. [`compose_artwork`] draws an (optionally reordered) palette as
//!    horizontal bands on a square, rectangle or circle and encodes a PNG.
//!
//! Both are exposed to JavaScript through `wasm-bindgen` and to native code
//! through the `*_bytes` helpers.

use js_sys::{Array, Object, Reflect, Uint8Array};
use wasm_bindgen::prelude::*;

pub mod color;
pub mod compose;
pub mod config;
pub mod error;
pub mod quantize;

pub use compose::{CompositionSpec, Shape, band_rows, compose_artwork, encode_png, render_artwork};
pub use config::{DEFAULT_COLORS, MAX_COLORS, MIN_COLORS, clamp_color_count};
pub use error::{ArtworkError, Result};
pub use quantize::{Palette, PaletteEntry, PixelBuffer, extract_palette};

fn js_err(e: ArtworkError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Decode an image and return its palette as an array of
/// `{ color: "rgb(r, g, b)", hex: "RRGGBB", percentage: "12.34" }` objects.
///
/// `n_colors` is clamped to the supported range.
#[wasm_bindgen(js_name = extractPalette)]
pub fn extract_palette_js(input: Vec<u8>, n_colors: usize) -> std::result::Result<Array, JsValue> {
    let img = image::load_from_memory(&input)
        .map_err(|e| js_err(ArtworkError::Decode(e)))?
        .to_rgba8();
    let palette = extract_palette(&PixelBuffer::from_image(&img), clamp_color_count(n_colors))
        .map_err(js_err)?;

    let out = Array::new();
    for entry in &palette {
        let obj = Object::new();
        Reflect::set(&obj, &JsValue::from_str("color"), &JsValue::from_str(&entry.css()))?;
        Reflect::set(&obj, &JsValue::from_str("hex"), &JsValue::from_str(&entry.hex()))?;
        Reflect::set(
            &obj,
            &JsValue::from_str("percentage"),
            &JsValue::from_str(&entry.percentage()),
        )?;
        out.push(&obj);
    }
    Ok(out)
}

/// Render palette artwork to PNG bytes.
///
/// `colors` holds color strings (`"rgb(r, g, b)"` or hex) in drawing order,
/// top band first. `width`/`height` are the source image's natural size;
/// when either is missing the canvas falls back to 300x300 (300x200 for
/// rectangles).
#[wasm_bindgen(js_name = composeArtwork)]
pub fn compose_artwork_js(
    colors: Array,
    shape: &str,
    width: Option<u32>,
    height: Option<u32>,
    transparent_background: bool,
) -> std::result::Result<Uint8Array, JsValue> {
    let mut parsed = Vec::new();
    for val in colors.iter() {
        let s = val
            .as_string()
            .ok_or_else(|| JsValue::from_str("Palette values must be strings"))?;
        parsed.push(color::parse_color(&s).map_err(js_err)?);
    }
    let spec = CompositionSpec::from_source(
        Palette::from_colors(parsed),
        shape.parse().map_err(js_err)?,
        width.zip(height),
        transparent_background,
    );
    let png = compose_artwork(&spec).map_err(js_err)?;
    Ok(Uint8Array::from(png.as_slice()))
}

/// Decode `input` and extract its palette. Also returns the decoded
/// dimensions so the caller can size the artwork after the source.
#[cfg(not(target_arch = "wasm32"))]
pub fn extract_palette_bytes(
    input: &[u8],
    n_colors: usize,
) -> Result<(Palette, (u32, u32))> {
    use image::GenericImageView;

    let img = image::load_from_memory(input).map_err(ArtworkError::Decode)?;
    let dims = img.dimensions();
    let rgba = img.to_rgba8();
    let palette = extract_palette(&PixelBuffer::from_image(&rgba), n_colors)?;
    Ok((palette, dims))
}
