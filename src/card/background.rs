/// Card background preparation
///
/// Decodes the downloaded photo once and keeps two copies: the full
/// decode (used for the high-resolution export) and a copy already
/// cover-fitted to the on-screen card size (used for every preview redraw).
use std::sync::Arc;

use image::RgbaImage;

use super::raster::cover_fit;
use super::{CARD_HEIGHT, CARD_WIDTH};
use crate::error::SourceError;

#[derive(Clone)]
pub struct Backdrop {
    pub full: Arc<RgbaImage>,
    pub preview: Arc<RgbaImage>,
}

impl std::fmt::Debug for Backdrop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backdrop")
            .field("full", &self.full.dimensions())
            .field("preview", &self.preview.dimensions())
            .finish()
    }
}

/// Decode and fit a downloaded photo off the UI thread
pub async fn prepare_backdrop(bytes: Vec<u8>) -> Result<Backdrop, SourceError> {
    // Spawn blocking because decoding and resampling are CPU-bound
    tokio::task::spawn_blocking(move || prepare_backdrop_blocking(&bytes))
        .await
        .map_err(|e| SourceError::decode(format!("Task join error: {}", e)))?
}

/// Blocking version of backdrop preparation
pub fn prepare_backdrop_blocking(bytes: &[u8]) -> Result<Backdrop, SourceError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| SourceError::decode(format!("Failed to decode photo: {}", e)))?
        .to_rgba8();

    let (width, height) = decoded.dimensions();
    if width == 0 || height == 0 {
        return Err(SourceError::decode("photo has no pixels"));
    }

    let preview = cover_fit(&decoded, CARD_WIDTH, CARD_HEIGHT);
    tracing::debug!("Prepared backdrop from {}x{} photo", width, height);

    Ok(Backdrop {
        full: Arc::new(decoded),
        preview: Arc::new(preview),
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    /// PNG bytes of a solid image
    pub fn png_bytes(width: u32, height: u32, color: Rgba<u8>) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, color);
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    pub fn backdrop(color: Rgba<u8>) -> Backdrop {
        prepare_backdrop_blocking(&png_bytes(60, 90, color)).unwrap()
    }
}
