use serde::Serialize;
use thiserror::Error;

/// A single schema violation found while validating a resize request.
///
/// `path` points at the offending field ("operations[2].quality"),
/// `message` explains the rule that was broken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub path: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Debug, Error)]
pub enum ResizeError {
    #[error("request validation failed: {} violation(s)", .0.len())]
    Validation(Vec<FieldViolation>),

    #[error("source object not found: {0}")]
    NotFound(String),

    #[error("source image rejected: {0}")]
    InvalidSource(String),

    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("object store error: {0}")]
    Store(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("operation {index}{} failed: {source}", tag_suffix(.tag))]
    OperationFailed {
        index: usize,
        tag: Option<String>,
        source: Box<ResizeError>,
    },
}

fn tag_suffix(tag: &Option<String>) -> String {
    match tag {
        Some(t) => format!(" (tag \"{t}\")"),
        None => String::new(),
    }
}

impl ResizeError {
    /// HTTP status the error translates to at the service boundary.
    ///
    /// Decode/encode failures count as client input errors: they stem from
    /// the referenced asset or the requested encode parameters.
    pub fn status(&self) -> u16 {
        match self {
            ResizeError::Validation(_)
            | ResizeError::InvalidSource(_)
            | ResizeError::Decode(_)
            | ResizeError::Encode(_) => 400,
            ResizeError::NotFound(_) => 404,
            ResizeError::Store(_) | ResizeError::Io(_) | ResizeError::Internal(_) => 500,
            ResizeError::OperationFailed { source, .. } => source.status(),
        }
    }
}

impl From<image::ImageError> for ResizeError {
    fn from(err: image::ImageError) -> Self {
        ResizeError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ResizeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ResizeError::Validation(vec![]).status(), 400);
        assert_eq!(ResizeError::NotFound("a.jpg".into()).status(), 404);
        assert_eq!(ResizeError::InvalidSource("too big".into()).status(), 400);
        assert_eq!(ResizeError::Decode("bad bytes".into()).status(), 400);
        assert_eq!(ResizeError::Encode("bad params".into()).status(), 400);
        assert_eq!(ResizeError::Store("timeout".into()).status(), 500);
        assert_eq!(ResizeError::Internal("oops".into()).status(), 500);
    }

    #[test]
    fn test_operation_failed_inherits_status() {
        let err = ResizeError::OperationFailed {
            index: 1,
            tag: Some("thumb".to_string()),
            source: Box::new(ResizeError::Encode("bad chroma".into())),
        };
        assert_eq!(err.status(), 400);

        let err = ResizeError::OperationFailed {
            index: 0,
            tag: None,
            source: Box::new(ResizeError::Store("connection reset".into())),
        };
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn test_operation_failed_message_includes_tag() {
        let err = ResizeError::OperationFailed {
            index: 2,
            tag: Some("hero".to_string()),
            source: Box::new(ResizeError::Encode("bad chroma".into())),
        };
        let msg = err.to_string();
        assert!(msg.contains("operation 2"));
        assert!(msg.contains("hero"));
        assert!(msg.contains("bad chroma"));
    }
}
