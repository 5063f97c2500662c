//! Image size normalization.
//!
//! Large inputs are scaled down so the larger dimension equals the bound,
//! preserving aspect ratio with floor semantics; inputs already within
//! bounds pass through byte-identical, which also makes the operation
//! idempotent.

use std::io::Cursor;

use bytes::Bytes;
use image::{imageops::FilterType, DynamicImage, GenericImageView, ImageFormat};

use crate::error::PipelineResult;

/// Decoded-and-bounded image handed to the matte engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    pub bytes: Bytes,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}

/// Target size for an out-of-bounds image, or None when no resize is needed.
/// The smaller dimension scales as `floor(other * max / larger)`.
fn bounded_dimensions(width: u32, height: u32, max_dimension: u32) -> Option<(u32, u32)> {
    if width <= max_dimension && height <= max_dimension {
        return None;
    }

    if width >= height {
        let new_height = ((height as u64 * max_dimension as u64) / width as u64) as u32;
        Some((max_dimension, new_height.max(1)))
    } else {
        let new_width = ((width as u64 * max_dimension as u64) / height as u64) as u32;
        Some((new_width.max(1), max_dimension))
    }
}

/// Heavier downscale ratios get cheaper filters.
fn select_filter(larger_dim: u32, max_dimension: u32) -> FilterType {
    let ratio = larger_dim as f32 / max_dimension as f32;
    if ratio > 2.0 {
        FilterType::Triangle
    } else if ratio > 1.5 {
        FilterType::CatmullRom
    } else {
        FilterType::Lanczos3
    }
}

/// Re-encode in the same format family. Jpeg has no alpha channel, and
/// formats without an encoder fall back to PNG.
fn encode(img: &DynamicImage, format: ImageFormat) -> PipelineResult<(Bytes, ImageFormat)> {
    let mut buf = Cursor::new(Vec::new());
    let format = match format {
        ImageFormat::Png => {
            img.write_to(&mut buf, ImageFormat::Png)?;
            ImageFormat::Png
        }
        ImageFormat::Jpeg => {
            DynamicImage::ImageRgb8(img.to_rgb8()).write_to(&mut buf, ImageFormat::Jpeg)?;
            ImageFormat::Jpeg
        }
        ImageFormat::WebP | ImageFormat::Gif => {
            DynamicImage::ImageRgba8(img.to_rgba8()).write_to(&mut buf, format)?;
            format
        }
        _ => {
            img.write_to(&mut buf, ImageFormat::Png)?;
            ImageFormat::Png
        }
    };
    Ok((Bytes::from(buf.into_inner()), format))
}

/// Bound an encoded image to `max_dimension`.
///
/// Deterministic and format-preserving: same encoded family in, same family
/// out (modulo the PNG fallback for encoder-less formats).
pub fn normalize(bytes: Bytes, max_dimension: u32) -> PipelineResult<NormalizedImage> {
    let format = image::guess_format(&bytes)?;
    let img = image::load_from_memory(&bytes)?;
    let (width, height) = img.dimensions();

    match bounded_dimensions(width, height, max_dimension) {
        None => Ok(NormalizedImage {
            bytes,
            width,
            height,
            format,
        }),
        Some((new_width, new_height)) => {
            let filter = select_filter(width.max(height), max_dimension);
            let resized = img.resize_exact(new_width, new_height, filter);
            let (bytes, format) = encode(&resized, format)?;
            tracing::debug!(
                width,
                height,
                new_width,
                new_height,
                "Normalized oversized image"
            );
            Ok(NormalizedImage {
                bytes,
                width: new_width,
                height: new_height,
                format,
            })
        }
    }
}
