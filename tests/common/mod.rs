//! Shared fixtures for integration tests: sample images plus in-memory
//! removal and storage backends.

use async_trait::async_trait;
use axum_test::TestServer;
use bgremove_server::{
    api::{app, AppState},
    error::PipelineError,
    pipeline::ReplacePipeline,
    removal::BackgroundRemover,
    storage::{MediaStorage, StoredAsset},
    Result,
};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), format)
        .expect("fixture image encodes");
    bytes
}

/// An opaque-background PNG
pub fn png_bytes() -> Vec<u8> {
    let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([120, 80, 40, 255])));
    encode(&image, ImageFormat::Png)
}

/// An opaque-background JPEG
pub fn jpeg_bytes() -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(
        image::RgbImage::from_pixel(8, 8, image::Rgb([40, 80, 120])),
    );
    encode(&image, ImageFormat::Jpeg)
}

/// PNG with a transparent background and an opaque subject pixel, the shape
/// a removal backend produces
pub fn transparent_png_bytes() -> Vec<u8> {
    let mut buffer = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 0]));
    buffer.put_pixel(4, 4, Rgba([255, 255, 255, 255]));
    encode(&DynamicImage::ImageRgba8(buffer), ImageFormat::Png)
}

/// Removal backend returning a fixed transparent PNG
pub struct MockRemover {
    calls: AtomicUsize,
    fail: bool,
}

impl MockRemover {
    pub fn ok() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackgroundRemover for MockRemover {
    async fn remove(&self, _image_bytes: &[u8]) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(PipelineError::removal("model unavailable"));
        }
        Ok(transparent_png_bytes())
    }
}

/// In-memory tag-to-asset storage
#[derive(Default)]
pub struct MockStorage {
    assets: Mutex<Vec<(String, StoredAsset)>>,
    next_id: AtomicUsize,
    mutations: AtomicUsize,
}

impl MockStorage {
    pub fn assets_for(&self, tag: &str) -> Vec<StoredAsset> {
        self.assets
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| t == tag)
            .map(|(_, asset)| asset.clone())
            .collect()
    }

    pub fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaStorage for MockStorage {
    async fn find_by_tag(&self, tag: &str) -> Result<Vec<StoredAsset>> {
        Ok(self.assets_for(tag))
    }

    async fn delete(&self, public_id: &str) -> Result<()> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.assets
            .lock()
            .unwrap()
            .retain(|(_, asset)| asset.public_id != public_id);
        Ok(())
    }

    async fn upload(&self, _bytes: Vec<u8>, tag: &str) -> Result<StoredAsset> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let asset = StoredAsset {
            public_id: format!("asset-{id}"),
            secure_url: format!("https://res.example/asset-{id}.png"),
        };
        self.assets
            .lock()
            .unwrap()
            .push((tag.to_string(), asset.clone()));
        Ok(asset)
    }
}

/// Spin up a test server over the given backends
pub fn test_server(remover: Arc<MockRemover>, storage: Arc<MockStorage>) -> TestServer {
    let pipeline = Arc::new(ReplacePipeline::new(remover, storage));
    let state = AppState {
        pipeline,
        max_upload_bytes: 10 * 1024 * 1024,
    };
    TestServer::new(app(state)).expect("test server starts")
}
