use crate::constants::{DEFAULT_CHROMA_SUBSAMPLING, DEFAULT_QUALITY, MAX_QUALITY};
use crate::error::{FieldViolation, ResizeError, Result};
use serde::{Deserialize, Serialize};

/// Body of a resize call, one source object and N derived variants.
///
/// Field names follow the wire contract (camelCase via serde).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeRequest {
    pub input: InputSpec,
    #[serde(default)]
    pub output: Option<OutputSettings>,
    pub operations: Vec<OperationSpec>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputSpec {
    /// Key of the source object in the store, e.g. "myImage.jpg" or a
    /// prefixed key like "2018/12/myImage.jpg".
    pub key: String,
}

/// Request-level defaults for the derived objects.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSettings {
    /// Base name for derived objects. When absent, the source key's file
    /// stem is used.
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub quality: Option<u8>,
    #[serde(default)]
    pub chroma_subsampling: Option<String>,
}

/// One independent resize+re-encode+upload unit.
///
/// `width`/`height` are used verbatim only when both are present; a lone
/// value is ignored and the bounding-box path runs instead. `maxWidth`/
/// `maxHeight` bound the output while preserving aspect ratio and default
/// to the source dimensions, so an empty spec is a no-op resize.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSpec {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub max_width: Option<u32>,
    #[serde(default)]
    pub max_height: Option<u32>,
    /// Overrides `output.quality` for this operation.
    #[serde(default)]
    pub quality: Option<u8>,
    /// Overrides `output.chromaSubsampling` for this operation.
    #[serde(default)]
    pub chroma_subsampling: Option<String>,
    /// Opaque label echoed in the result for caller-side correlation.
    #[serde(default)]
    pub tag: Option<String>,
}

impl OperationSpec {
    /// Explicit target dimensions, only when both are supplied.
    pub fn explicit_dimensions(&self) -> Option<(u32, u32)> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some((w, h)),
            _ => None,
        }
    }
}

/// Layered-default resolution: operation value, then request value, then
/// the system default.
pub fn resolve<T: Clone>(operation: Option<&T>, request: Option<&T>, default: T) -> T {
    operation.or(request).cloned().unwrap_or(default)
}

/// Encoding parameters after default resolution, per operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEncoding {
    pub quality: u8,
    pub chroma_subsampling: String,
}

impl ResizeRequest {
    /// Validate the request against the schema, collecting every violation
    /// rather than stopping at the first. Pure; no I/O happens here.
    pub fn validate(&self) -> Result<()> {
        let mut violations = Vec::new();

        if self.input.key.trim().is_empty() {
            violations.push(FieldViolation::new("input.key", "is required"));
        }

        if let Some(output) = &self.output {
            if let Some(q) = output.quality {
                if q > MAX_QUALITY {
                    violations.push(FieldViolation::new(
                        "output.quality",
                        format!("must be between 0 and {MAX_QUALITY}, got {q}"),
                    ));
                }
            }
            if let Some(key) = &output.key {
                if key.trim().is_empty() {
                    violations.push(FieldViolation::new("output.key", "must not be empty"));
                }
            }
        }

        if self.operations.is_empty() {
            violations.push(FieldViolation::new(
                "operations",
                "at least one operation is required",
            ));
        }

        for (i, op) in self.operations.iter().enumerate() {
            let dims = [
                ("width", op.width),
                ("height", op.height),
                ("maxWidth", op.max_width),
                ("maxHeight", op.max_height),
            ];
            for (field, value) in dims {
                if value == Some(0) {
                    violations.push(FieldViolation::new(
                        format!("operations[{i}].{field}"),
                        "must be greater than zero",
                    ));
                }
            }
            if let Some(q) = op.quality {
                if q > MAX_QUALITY {
                    violations.push(FieldViolation::new(
                        format!("operations[{i}].quality"),
                        format!("must be between 0 and {MAX_QUALITY}, got {q}"),
                    ));
                }
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ResizeError::Validation(violations))
        }
    }

    /// Encoding parameters for one operation after default layering.
    pub fn resolve_encoding(&self, op: &OperationSpec) -> ResolvedEncoding {
        let output = self.output.as_ref();
        ResolvedEncoding {
            quality: resolve(
                op.quality.as_ref(),
                output.and_then(|o| o.quality.as_ref()),
                DEFAULT_QUALITY,
            ),
            chroma_subsampling: resolve(
                op.chroma_subsampling.as_ref(),
                output.and_then(|o| o.chroma_subsampling.as_ref()),
                DEFAULT_CHROMA_SUBSAMPLING.to_string(),
            ),
        }
    }

    /// Base name for derived object keys: `output.key` when given,
    /// otherwise the file stem of the source key.
    pub fn output_key_base(&self) -> Result<String> {
        if let Some(key) = self.output.as_ref().and_then(|o| o.key.as_deref()) {
            return Ok(key.to_string());
        }

        let stem = std::path::Path::new(&self.input.key)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty());

        match stem {
            Some(stem) => Ok(stem.to_string()),
            None => Err(ResizeError::Validation(vec![FieldViolation::new(
                "output.key",
                "is required when the input key has no usable file stem",
            )])),
        }
    }
}
