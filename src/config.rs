use crate::constants::{
    DEFAULT_ALLOWED_IMAGE_TYPES, DEFAULT_HOST, DEFAULT_MAX_FILE_SIZE_MB,
    DEFAULT_MAX_HEIGHT_PIXELS, DEFAULT_MAX_WIDTH_PIXELS, DEFAULT_PORT,
};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub limits: SourceLimits,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory backing the filesystem store; `None` selects the
    /// in-memory backend (ephemeral, useful for local experiments).
    pub root: Option<PathBuf>,
    /// Base URL reported in variant locations.
    pub base_url: String,
}

/// Guard rails applied to the fetched source image before any operation
/// runs. Oversized or unsupported sources are a client input error.
#[derive(Debug, Clone)]
pub struct SourceLimits {
    pub max_file_size_mb: u64,
    pub max_width_pixels: u32,
    pub max_height_pixels: u32,
    pub allowed_image_types: Vec<String>,
}

impl Default for SourceLimits {
    fn default() -> Self {
        Self {
            max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
            max_width_pixels: DEFAULT_MAX_WIDTH_PIXELS,
            max_height_pixels: DEFAULT_MAX_HEIGHT_PIXELS,
            allowed_image_types: DEFAULT_ALLOWED_IMAGE_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = SourceLimits::default();

        Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
                port: env_or("PORT", DEFAULT_PORT),
            },
            storage: StorageConfig {
                root: env::var("STORAGE_ROOT").ok().map(PathBuf::from),
                base_url: env::var("STORAGE_BASE_URL")
                    .unwrap_or_else(|_| format!("http://{DEFAULT_HOST}:{DEFAULT_PORT}/objects")),
            },
            limits: SourceLimits {
                max_file_size_mb: env_or("MAX_FILE_SIZE_MB", defaults.max_file_size_mb),
                max_width_pixels: env_or("MAX_WIDTH_PIXELS", defaults.max_width_pixels),
                max_height_pixels: env_or("MAX_HEIGHT_PIXELS", defaults.max_height_pixels),
                allowed_image_types: env::var("ALLOWED_IMAGE_TYPES")
                    .map(|v| {
                        v.split(',')
                            .map(|s| s.trim().to_lowercase())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or(defaults.allowed_image_types),
            },
        }
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
