/// Card export: rasterize at high resolution, encode PNG, write the file
///
/// The write is atomic from the user's point of view: bytes go to a hidden
/// partial file that is renamed into place only when complete, and removed
/// on any failure.
use std::fs;
use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};

use super::raster::{CardScene, Rasterizer, SoftwareRasterizer};
use crate::error::CardError;

/// `thank-you-card-<millis>.png`
pub fn file_name(timestamp_ms: i64) -> String {
    format!("thank-you-card-{}.png", timestamp_ms)
}

/// One export request, detached from the composer state
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub scene: CardScene,
    pub scale: u32,
    /// Export instant, milliseconds since the epoch
    pub timestamp_ms: i64,
    pub download_dir: PathBuf,
}

impl ExportJob {
    /// Run every step; returns the written file
    pub fn run(&self, rasterizer: &impl Rasterizer) -> Result<PathBuf, CardError> {
        let bitmap = rasterizer.rasterize(&self.scene, self.scale)?;
        let png = encode_png(&bitmap)?;
        let path = write_atomic(&self.download_dir, &file_name(self.timestamp_ms), &png)?;

        tracing::info!(
            "Exported {}x{} card to {}",
            bitmap.width(),
            bitmap.height(),
            path.display()
        );
        Ok(path)
    }
}

/// Run an export with the software rasterizer off the UI thread
pub async fn export_card(job: ExportJob) -> Result<PathBuf, CardError> {
    // Spawn blocking because rasterizing and encoding are CPU-bound
    tokio::task::spawn_blocking(move || job.run(&SoftwareRasterizer))
        .await
        .map_err(|e| CardError::ExportFailed(format!("Task join error: {}", e)))?
}

/// Lossless RGBA PNG, alpha kept as is
pub fn encode_png(bitmap: &RgbaImage) -> Result<Vec<u8>, CardError> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(
            bitmap.as_raw(),
            bitmap.width(),
            bitmap.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| CardError::ExportFailed(format!("Failed to encode PNG: {}", e)))?;
    Ok(out)
}

fn write_atomic(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, CardError> {
    fs::create_dir_all(dir).map_err(|e| {
        CardError::ExportFailed(format!("Failed to create {}: {}", dir.display(), e))
    })?;

    let target = dir.join(file_name);
    let partial = dir.join(format!(".{}.part", file_name));

    let result = fs::write(&partial, bytes).and_then(|_| fs::rename(&partial, &target));
    if let Err(e) = result {
        let _ = fs::remove_file(&partial);
        return Err(CardError::ExportFailed(format!(
            "Failed to write {}: {}",
            target.display(),
            e
        )));
    }

    Ok(target)
}
