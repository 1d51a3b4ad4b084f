/// Card rendering and export module
///
/// This module handles:
/// - Decoding the selected photo and fitting it to the card (background.rs)
/// - Composing background, overlay and text into a bitmap (raster.rs)
/// - Encoding the bitmap as PNG and writing the download (export.rs)

pub mod background;
pub mod export;
pub mod raster;

/// On-screen card size in logical pixels (4:5)
pub const CARD_WIDTH: u32 = 448;
pub const CARD_HEIGHT: u32 = 560;

/// Inner padding around the text
pub const CARD_PADDING: u32 = 32;

/// Export resolution multiplier
pub const OVERSAMPLE: u32 = 3;

pub const HEADING: &str = "Thank You";
