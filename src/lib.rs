pub mod codec;
pub mod config;
pub mod constants;
pub mod dimensions;
pub mod error;
pub mod handlers;
pub mod request;
pub mod service;
pub mod store;

pub use codec::{ImageCodec, ImageMetadata, JpegCodec, TranscodeParams};
pub use config::{AppConfig, SourceLimits};
pub use dimensions::{aspect_ratio_fit, gcd, ratio_label, FitDimensions};
pub use error::{FieldViolation, ResizeError, Result};
pub use handlers::router;
pub use request::{
    resolve, InputSpec, OperationSpec, OutputSettings, ResizeRequest, ResolvedEncoding,
};
pub use service::{
    ImageStats, OperationMetrics, OperationResult, ResizeService, SourceImage,
};
pub use store::{FsStore, MemoryStore, ObjectStore, StoredObject};
