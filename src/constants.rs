pub const DEFAULT_QUALITY: u8 = 80;
pub const MAX_QUALITY: u8 = 100;

pub const DEFAULT_CHROMA_SUBSAMPLING: &str = "4:4:4";

/// Chroma-subsampling labels the JPEG codec accepts.
pub const SUPPORTED_CHROMA_SUBSAMPLING: &[&str] = &["4:4:4", "4:2:2", "4:2:0", "4:1:1"];

pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 10;
pub const DEFAULT_MAX_WIDTH_PIXELS: u32 = 10_000;
pub const DEFAULT_MAX_HEIGHT_PIXELS: u32 = 10_000;
pub const DEFAULT_ALLOWED_IMAGE_TYPES: &[&str] = &["jpeg", "png", "webp", "tiff"];

/// Derived objects are always encoded as JPEG, hence the fixed extension.
pub const OUTPUT_EXTENSION: &str = "jpg";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
