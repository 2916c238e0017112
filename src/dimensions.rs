//! Pure dimension math for the resize pipeline.
//!
//! No I/O and no image data here; everything is testable with plain numbers.

use crate::error::{ResizeError, Result};

/// Output of a bounding-box fit: the scaled dimensions and the ratio that
/// produced them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitDimensions {
    pub width: u32,
    pub height: u32,
    pub ratio: f64,
}

/// Scale `src_width`x`src_height` to fit within `max_width`x`max_height`
/// while preserving aspect ratio.
///
/// Missing bounds default to the corresponding source dimension, so a call
/// with neither bound is an identity fit (ratio 1.0). Scaled dimensions are
/// floored, never rounded up, so they cannot exceed a bound.
///
/// Zero source dimensions indicate malformed decoder metadata and are an
/// internal error, not a user input error. This function happily scales
/// up when a bound exceeds the source; the upscale guard belongs to the
/// orchestrator.
pub fn aspect_ratio_fit(
    src_width: u32,
    src_height: u32,
    max_width: Option<u32>,
    max_height: Option<u32>,
) -> Result<FitDimensions> {
    if src_width == 0 || src_height == 0 {
        return Err(ResizeError::Internal(format!(
            "source dimensions must be positive, got {src_width}x{src_height}"
        )));
    }

    let max_width = max_width.unwrap_or(src_width);
    let max_height = max_height.unwrap_or(src_height);

    let ratio = f64::min(
        max_width as f64 / src_width as f64,
        max_height as f64 / src_height as f64,
    );

    Ok(FitDimensions {
        width: (src_width as f64 * ratio).floor() as u32,
        height: (src_height as f64 * ratio).floor() as u32,
        ratio,
    })
}

/// Greatest common divisor (Euclid).
pub fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// String label for an aspect ratio, e.g. 1920x1080 -> "16:9".
pub fn ratio_label(width: u32, height: u32) -> String {
    let d = gcd(width, height);
    if d == 0 {
        return format!("{width}:{height}");
    }
    format!("{}:{}", width / d, height / d)
}
