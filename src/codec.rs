//! Image codec capability: metadata extraction and resize+re-encode.
//!
//! The orchestrator only talks to the [`ImageCodec`] trait; [`JpegCodec`]
//! implements it over the `image` crate. Codec calls are CPU-bound and are
//! run on the blocking pool by the caller.

use crate::constants::SUPPORTED_CHROMA_SUBSAMPLING;
use crate::error::{ResizeError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ImageFormat, ImageReader};
use std::io::Cursor;

/// Decoded properties of an image buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    /// Encoded byte size of the buffer, not the pixel data.
    pub size: u64,
    /// Lowercase format name, e.g. "jpeg".
    pub format: String,
}

/// Target parameters for one transcode call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeParams {
    pub width: u32,
    pub height: u32,
    pub quality: u8,
    pub chroma_subsampling: String,
}

pub trait ImageCodec: Send + Sync {
    /// Inspect an encoded image buffer without transforming it.
    fn metadata(&self, bytes: &[u8]) -> Result<ImageMetadata>;

    /// Resize to exactly `params.width`x`params.height` and re-encode.
    fn transcode(&self, bytes: &[u8], params: &TranscodeParams) -> Result<Vec<u8>>;
}

/// `image`-crate backed codec producing JPEG output.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegCodec;

impl JpegCodec {
    pub fn new() -> Self {
        Self
    }
}

fn format_name(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::Bmp => "bmp".to_string(),
        other => format!("{other:?}").to_lowercase(),
    }
}

impl ImageCodec for JpegCodec {
    fn metadata(&self, bytes: &[u8]) -> Result<ImageMetadata> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ResizeError::Decode(e.to_string()))?;
        let format = reader
            .format()
            .ok_or_else(|| ResizeError::Decode("unrecognized image format".to_string()))?;
        // Header-only read; full pixel decode happens in transcode.
        let (width, height) = reader.into_dimensions()?;

        Ok(ImageMetadata {
            width,
            height,
            size: bytes.len() as u64,
            format: format_name(format),
        })
    }

    fn transcode(&self, bytes: &[u8], params: &TranscodeParams) -> Result<Vec<u8>> {
        if !SUPPORTED_CHROMA_SUBSAMPLING.contains(&params.chroma_subsampling.as_str()) {
            return Err(ResizeError::Encode(format!(
                "unsupported chroma subsampling \"{}\"",
                params.chroma_subsampling
            )));
        }

        let img = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ResizeError::Decode(e.to_string()))?
            .decode()?;

        let resized = img.resize_exact(params.width, params.height, FilterType::Lanczos3);

        // The jpeg encoder rejects quality 0; the schema allows it, so
        // clamp to the encoder's floor.
        let quality = params.quality.max(1);
        let mut out = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut out, quality);
        resized
            .write_with_encoder(encoder)
            .map_err(|e| ResizeError::Encode(e.to_string()))?;

        Ok(out)
    }
}
