use async_trait::async_trait;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgb, RgbImage};
use img_variant::{MemoryStore, ObjectStore, ResizeError, StoredObject};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Build an in-memory JPEG of the given dimensions. A gradient rather than
/// a flat color so re-encoding at lower sizes actually shrinks the buffer.
pub fn jpeg_fixture(width: u32, height: u32) -> Bytes {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_with_encoder(JpegEncoder::new_with_quality(&mut out, 90))
        .unwrap();
    Bytes::from(out)
}

/// Object store mock that counts calls and can be told to fail puts for
/// keys containing a marker substring.
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    get_calls: AtomicUsize,
    put_calls: AtomicUsize,
    fail_put_containing: Option<String>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_puts_containing(marker: impl Into<String>) -> Self {
        Self {
            fail_put_containing: Some(marker.into()),
            ..Self::default()
        }
    }

    pub fn seed(&self, key: &str, bytes: Bytes) {
        self.inner.insert(key, bytes);
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    pub fn object(&self, key: &str) -> Option<Bytes> {
        self.inner.object(key)
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn get(&self, key: &str) -> img_variant::Result<Bytes> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, bytes: Bytes, prefix: &str) -> img_variant::Result<StoredObject> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(marker) = &self.fail_put_containing {
            if key.contains(marker.as_str()) {
                return Err(ResizeError::Store(format!("injected failure for {key}")));
            }
        }
        self.inner.put(key, bytes, prefix).await
    }
}
