//! The resize orchestrator: validate, fetch once, fan out one task per
//! operation, collect results in request order.

use crate::codec::{ImageCodec, TranscodeParams};
use crate::config::SourceLimits;
use crate::constants::OUTPUT_EXTENSION;
use crate::dimensions::aspect_ratio_fit;
use crate::error::{ResizeError, Result};
use crate::request::{OperationSpec, ResizeRequest, ResolvedEncoding};
use crate::store::{ObjectStore, StoredObject};
use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::task;
use tracing::{debug, info, instrument, warn};

/// The source object, fetched and inspected once per request and shared
/// read-only across all operation tasks. `Bytes` clones are reference
/// counted, so no operation can touch another's view of the buffer.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub bytes: Bytes,
    pub width: u32,
    pub height: u32,
    pub size: u64,
    pub format: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageStats {
    pub width: u32,
    pub height: u32,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationMetrics {
    pub processing_time_seconds: f64,
    pub size_reduction_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub input: ImageStats,
    pub output: ImageStats,
}

/// Outcome of one operation, in the order the request listed them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    pub location: StoredObject,
    pub metrics: OperationMetrics,
}

/// Target dimensions for one operation: explicit width+height verbatim,
/// otherwise a bounding-box fit against maxWidth/maxHeight.
pub fn target_dimensions(spec: &OperationSpec, src_width: u32, src_height: u32) -> Result<(u32, u32)> {
    if let Some((w, h)) = spec.explicit_dimensions() {
        return Ok((w, h));
    }
    let fit = aspect_ratio_fit(src_width, src_height, spec.max_width, spec.max_height)?;
    Ok((fit.width, fit.height))
}

/// Percentage drop in byte size from source to variant. Negative when the
/// variant grew.
pub fn size_reduction_percent(input_size: u64, output_size: u64) -> f64 {
    if input_size == 0 {
        return 0.0;
    }
    (input_size as f64 - output_size as f64) / input_size as f64 * 100.0
}

pub struct ResizeService {
    store: Arc<dyn ObjectStore>,
    codec: Arc<dyn ImageCodec>,
    limits: SourceLimits,
}

impl ResizeService {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        codec: Arc<dyn ImageCodec>,
        limits: SourceLimits,
    ) -> Self {
        Self {
            store,
            codec,
            limits,
        }
    }

    /// Run the whole pipeline for one request.
    ///
    /// Operations run concurrently; results come back in request order
    /// regardless of completion order. The batch is all-or-nothing: the
    /// first failing operation aborts the rest and surfaces as an error
    /// naming the operation's index and tag. Variants already uploaded by
    /// sibling operations stay in place.
    #[instrument(skip_all, fields(key = %request.input.key, operations = request.operations.len()))]
    pub async fn process(&self, request: ResizeRequest) -> Result<Vec<OperationResult>> {
        request.validate()?;
        // Key-base resolution can also reject the request (stem-less input
        // key and no output.key), so it happens before any storage I/O.
        let key_base = request.output_key_base()?;

        let source_bytes = self.store.get(&request.input.key).await?;
        debug!(size = source_bytes.len(), "fetched source object");

        let meta = {
            let codec = Arc::clone(&self.codec);
            let bytes = source_bytes.clone();
            task::spawn_blocking(move || codec.metadata(&bytes))
                .await
                .map_err(|e| ResizeError::Internal(format!("metadata task failed: {e}")))??
        };
        self.check_source(&meta.format, meta.width, meta.height, meta.size)?;

        let source = SourceImage {
            bytes: source_bytes,
            width: meta.width,
            height: meta.height,
            size: meta.size,
            format: meta.format,
        };
        info!(
            width = source.width,
            height = source.height,
            format = %source.format,
            "processing source image"
        );

        // One prefix per request so sibling variants land together.
        let prefix = Utc::now().format("%Y/%m").to_string();

        let mut handles = Vec::with_capacity(request.operations.len());
        for (index, spec) in request.operations.iter().enumerate() {
            let encoding = request.resolve_encoding(spec);
            let ctx = OperationContext {
                source: source.clone(),
                spec: spec.clone(),
                encoding,
                key_base: key_base.clone(),
                prefix: prefix.clone(),
                store: Arc::clone(&self.store),
                codec: Arc::clone(&self.codec),
            };
            let tag = spec.tag.clone();
            handles.push((index, tag, tokio::spawn(run_operation(ctx))));
        }

        // Fan-in: awaiting in spawn order restores request order no matter
        // which task finished first.
        let mut results = Vec::with_capacity(handles.len());
        let mut failure: Option<ResizeError> = None;
        for (index, tag, handle) in handles {
            if failure.is_some() {
                handle.abort();
                continue;
            }
            match handle.await {
                Ok(Ok(result)) => results.push(result),
                Ok(Err(source)) => {
                    warn!(index, ?tag, error = %source, "operation failed, aborting batch");
                    failure = Some(ResizeError::OperationFailed {
                        index,
                        tag,
                        source: Box::new(source),
                    });
                }
                Err(e) => {
                    failure = Some(ResizeError::Internal(format!(
                        "operation {index} task failed: {e}"
                    )));
                }
            }
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(results),
        }
    }

    fn check_source(&self, format: &str, width: u32, height: u32, size: u64) -> Result<()> {
        let limits = &self.limits;
        let max_bytes = limits.max_file_size_mb * 1_000_000;
        if size > max_bytes {
            return Err(ResizeError::InvalidSource(format!(
                "image exceeds maximum file size of {} Mb",
                limits.max_file_size_mb
            )));
        }
        if !limits.allowed_image_types.iter().any(|t| t == format) {
            return Err(ResizeError::InvalidSource(format!(
                "image format {format} is not supported"
            )));
        }
        if width > limits.max_width_pixels {
            return Err(ResizeError::InvalidSource(format!(
                "image exceeds maximum width of {} pixels",
                limits.max_width_pixels
            )));
        }
        if height > limits.max_height_pixels {
            return Err(ResizeError::InvalidSource(format!(
                "image exceeds maximum height of {} pixels",
                limits.max_height_pixels
            )));
        }
        Ok(())
    }
}

struct OperationContext {
    source: SourceImage,
    spec: OperationSpec,
    encoding: ResolvedEncoding,
    key_base: String,
    prefix: String,
    store: Arc<dyn ObjectStore>,
    codec: Arc<dyn ImageCodec>,
}

async fn run_operation(ctx: OperationContext) -> Result<OperationResult> {
    let started = Instant::now();

    let (target_width, target_height) =
        target_dimensions(&ctx.spec, ctx.source.width, ctx.source.height)?;

    // Upscale guard: transcoding to a size at or above the source would
    // only lose quality, so reuse the original bytes for those targets.
    let shrinks = target_width < ctx.source.width && target_height < ctx.source.height;
    let output_bytes = if shrinks {
        let codec = Arc::clone(&ctx.codec);
        let bytes = ctx.source.bytes.clone();
        let params = TranscodeParams {
            width: target_width,
            height: target_height,
            quality: ctx.encoding.quality,
            chroma_subsampling: ctx.encoding.chroma_subsampling.clone(),
        };
        let encoded = task::spawn_blocking(move || codec.transcode(&bytes, &params))
            .await
            .map_err(|e| ResizeError::Internal(format!("transcode task failed: {e}")))??;
        Bytes::from(encoded)
    } else {
        debug!(
            target_width,
            target_height,
            source_width = ctx.source.width,
            source_height = ctx.source.height,
            "target not smaller than source, skipping transcode"
        );
        ctx.source.bytes.clone()
    };

    let out_meta = {
        let codec = Arc::clone(&ctx.codec);
        let bytes = output_bytes.clone();
        task::spawn_blocking(move || codec.metadata(&bytes))
            .await
            .map_err(|e| ResizeError::Internal(format!("metadata task failed: {e}")))??
    };

    let key = format!(
        "{}-{}x{}.{}",
        ctx.key_base, out_meta.width, out_meta.height, OUTPUT_EXTENSION
    );
    let location = ctx
        .store
        .put(&key, output_bytes, &ctx.prefix)
        .await?;
    debug!(url = %location.url, "variant uploaded");

    Ok(OperationResult {
        location,
        metrics: OperationMetrics {
            processing_time_seconds: started.elapsed().as_secs_f64(),
            size_reduction_percent: size_reduction_percent(ctx.source.size, out_meta.size),
            tag: ctx.spec.tag.clone(),
            input: ImageStats {
                width: ctx.source.width,
                height: ctx.source.height,
                size: ctx.source.size,
            },
            output: ImageStats {
                width: out_meta.width,
                height: out_meta.height,
                size: out_meta.size,
            },
        },
    })
}
