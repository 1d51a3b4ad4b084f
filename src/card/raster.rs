/// Software rasterizer for the card
///
/// Draws the card exactly as the preview shows it: the photo cover-fitted
/// to 4:5, a dark overlay, the heading at the top and the name at the
/// bottom. Everything scales with the oversampling factor so the preview
/// (scale 1) and the export (scale 3) have identical proportions.
use std::sync::Arc;

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use super::{CARD_HEIGHT, CARD_PADDING, CARD_WIDTH, HEADING};
use crate::color::{blend_over, text_color, OVERLAY};
use crate::error::CardError;
use crate::state::customization::{CardCustomization, FontChoice};

/// Heading glyph cell size at scale 1 (8px cell x 5 = 40px)
const HEADING_UNIT: u32 = 5;
/// Name glyph cell size at scale 1 (24px)
const NAME_UNIT: u32 = 3;

/// Everything needed to draw one card
#[derive(Clone)]
pub struct CardScene {
    pub background: Arc<RgbaImage>,
    pub customization: CardCustomization,
}

impl std::fmt::Debug for CardScene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardScene")
            .field("background", &self.background.dimensions())
            .field("customization", &self.customization)
            .finish()
    }
}

/// Turns a card scene into pixels
pub trait Rasterizer {
    fn rasterize(&self, scene: &CardScene, scale: u32) -> Result<RgbaImage, CardError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareRasterizer;

impl Rasterizer for SoftwareRasterizer {
    fn rasterize(&self, scene: &CardScene, scale: u32) -> Result<RgbaImage, CardError> {
        let scale = scale.max(1);
        let (width, height) = (CARD_WIDTH * scale, CARD_HEIGHT * scale);
        let (bw, bh) = scene.background.dimensions();
        if bw == 0 || bh == 0 {
            return Err(CardError::ExportFailed("background image is empty".to_string()));
        }

        // Starts as the photo itself; transparent regions stay transparent
        let mut canvas = cover_fit(&scene.background, width, height);
        for pixel in canvas.pixels_mut() {
            *pixel = blend_over(*pixel, OVERLAY);
        }

        let card = &scene.customization;
        let face = Face::from(card.font);
        let color = text_color(&card.color);
        let padding = CARD_PADDING * scale;
        let max_width = width.saturating_sub(2 * padding);

        let unit = fit_unit(HEADING, face, HEADING_UNIT, CARD_WIDTH - 2 * CARD_PADDING) * scale;
        let x = centered(width, face.measure(HEADING) * unit);
        draw_text(&mut canvas, HEADING, face, x, padding as i64, unit, color);

        if card.shows_name() {
            let unit = fit_unit(&card.name, face, NAME_UNIT, CARD_WIDTH - 2 * CARD_PADDING) * scale;
            let text_width = face.measure(&card.name) * unit;
            let x = if text_width > max_width {
                // Still too long at the smallest size: start at the padding, clip at the edge
                padding as i64
            } else {
                centered(width, text_width)
            };
            let y = height as i64 - padding as i64 - 8 * unit as i64;
            draw_text(&mut canvas, &card.name, face, x, y, unit, color);
        }

        Ok(canvas)
    }
}

/// Scale and center-crop `image` so it covers `width` x `height`
pub fn cover_fit(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let (iw, ih) = image.dimensions();
    if (iw, ih) == (width, height) {
        return image.clone();
    }

    let factor = f64::max(
        f64::from(width) / f64::from(iw),
        f64::from(height) / f64::from(ih),
    );
    let rw = ((f64::from(iw) * factor).ceil() as u32).max(width);
    let rh = ((f64::from(ih) * factor).ceil() as u32).max(height);
    let resized = imageops::resize(image, rw, rh, FilterType::Lanczos3);

    let x = (rw - width) / 2;
    let y = (rh - height) / 2;
    imageops::crop_imm(&resized, x, y, width, height).to_image()
}

/// How a font choice is drawn with the bitmap glyphs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Face {
    bold: bool,
    slanted: bool,
    proportional: bool,
}

impl From<FontChoice> for Face {
    fn from(font: FontChoice) -> Self {
        match font {
            FontChoice::Serif => Face { bold: true, slanted: false, proportional: true },
            FontChoice::Sans => Face { bold: false, slanted: false, proportional: true },
            FontChoice::Cursive => Face { bold: false, slanted: true, proportional: true },
            FontChoice::Mono => Face { bold: false, slanted: false, proportional: false },
        }
    }
}

impl Face {
    /// Horizontal advance of one character, in glyph cells
    fn advance(self, ch: char) -> u32 {
        if !self.proportional {
            return 8;
        }
        match ink_columns(&glyph(ch)) {
            Some((first, last)) => last - first + 2 + u32::from(self.bold),
            None => 4,
        }
    }

    /// Width of a line, in glyph cells
    fn measure(self, text: &str) -> u32 {
        let slant = if self.slanted { 2 } else { 0 };
        text.chars().map(|ch| self.advance(ch)).sum::<u32>() + slant
    }
}

fn glyph(ch: char) -> [u8; 8] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

/// First and last column holding any set bit (bit 0 is the left column)
fn ink_columns(rows: &[u8; 8]) -> Option<(u32, u32)> {
    let mask = rows.iter().fold(0u8, |acc, row| acc | row);
    if mask == 0 {
        return None;
    }
    Some((mask.trailing_zeros(), 7 - mask.leading_zeros()))
}

/// Largest cell size up to `preferred` that fits `text` in `max_width`
fn fit_unit(text: &str, face: Face, preferred: u32, max_width: u32) -> u32 {
    let width = face.measure(text);
    let mut unit = preferred;
    while unit > 1 && width * unit > max_width {
        unit -= 1;
    }
    unit
}

fn centered(outer: u32, inner: u32) -> i64 {
    (i64::from(outer) - i64::from(inner)) / 2
}

fn draw_text(
    canvas: &mut RgbaImage,
    text: &str,
    face: Face,
    x: i64,
    y: i64,
    unit: u32,
    color: Rgba<u8>,
) {
    let unit = i64::from(unit.max(1));
    let bold_offset = (unit / 2).max(1);
    let mut cursor = x;

    for ch in text.chars() {
        let rows = glyph(ch);
        // Proportional faces start at the first inked column
        let skip = match (face.proportional, ink_columns(&rows)) {
            (true, Some((first, _))) => i64::from(first),
            _ => 0,
        };

        for (row_idx, row) in rows.iter().enumerate() {
            let row_idx = row_idx as i64;
            let shear = if face.slanted { (7 - row_idx) * unit / 4 } else { 0 };
            for col in 0..8i64 {
                if (row >> col) & 1 == 0 {
                    continue;
                }
                let px = cursor + (col - skip) * unit + shear;
                let py = y + row_idx * unit;
                fill_cell(canvas, px, py, unit, color);
                if face.bold {
                    fill_cell(canvas, px + bold_offset, py, unit, color);
                }
            }
        }

        cursor += i64::from(face.advance(ch)) * unit;
    }
}

/// Blend a `size` x `size` block, clipped to the canvas
fn fill_cell(canvas: &mut RgbaImage, x: i64, y: i64, size: i64, color: Rgba<u8>) {
    let (w, h) = (i64::from(canvas.width()), i64::from(canvas.height()));
    for ty in y.max(0)..(y + size).min(h) {
        for tx in x.max(0)..(x + size).min(w) {
            let pixel = canvas.get_pixel_mut(tx as u32, ty as u32);
            *pixel = blend_over(*pixel, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, color: Rgba<u8>) -> Arc<RgbaImage> {
        Arc::new(RgbaImage::from_pixel(width, height, color))
    }

    fn scene(name: &str, background: Arc<RgbaImage>) -> CardScene {
        let mut customization = CardCustomization::new("https://img/1");
        customization.name = name.to_string();
        CardScene {
            background,
            customization,
        }
    }

    /// Count pixels equal to `color` inside a horizontal band
    fn count_in_band(image: &RgbaImage, y0: u32, y1: u32, color: Rgba<u8>) -> usize {
        (y0..y1)
            .flat_map(|y| (0..image.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| *image.get_pixel(x, y) == color)
            .count()
    }

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const GRAY: Rgba<u8> = Rgba([100, 100, 100, 255]);

    #[test]
    fn test_size_scales_with_oversampling() {
        let bg = solid(300, 300, GRAY);
        let preview = SoftwareRasterizer.rasterize(&scene("", bg.clone()), 1).unwrap();
        assert_eq!(preview.dimensions(), (448, 560));

        let export = SoftwareRasterizer.rasterize(&scene("", bg), 3).unwrap();
        assert_eq!(export.dimensions(), (1344, 1680));
    }

    #[test]
    fn test_overlay_and_heading() {
        let image = SoftwareRasterizer.rasterize(&scene("", solid(448, 560, GRAY)), 1).unwrap();

        // Corner: photo under the 40% black overlay
        assert_eq!(*image.get_pixel(0, 0), Rgba([60, 60, 60, 255]));

        // Heading band is inked with the default white
        let heading = count_in_band(&image, 32, 72, WHITE);
        assert!(heading > 0);

        // Nothing drawn at the bottom without a name
        assert_eq!(count_in_band(&image, 560 - 32 - 24, 560 - 32, WHITE), 0);
    }

    #[test]
    fn test_name_drawn_at_bottom_in_chosen_color() {
        let mut card = scene("Jane", solid(448, 560, GRAY));
        card.customization.color = "#ff0000".to_string();
        let image = SoftwareRasterizer.rasterize(&card, 1).unwrap();

        let red = Rgba([255, 0, 0, 255]);
        assert!(count_in_band(&image, 560 - 32 - 24, 560 - 32, red) > 0);
        assert_eq!(count_in_band(&image, 0, 560, WHITE), 0);
    }

    #[test]
    fn test_transparency_is_preserved() {
        let image = SoftwareRasterizer
            .rasterize(&scene("", solid(448, 560, Rgba([0, 0, 0, 0]))), 1)
            .unwrap();
        // No implicit fill: only the overlay's own alpha remains
        assert_eq!(*image.get_pixel(5, 300), Rgba([0, 0, 0, 102]));
    }

    #[test]
    fn test_empty_background_fails() {
        let result = SoftwareRasterizer.rasterize(&scene("", Arc::new(RgbaImage::new(0, 0))), 1);
        assert!(matches!(result, Err(CardError::ExportFailed(_))));
    }

    #[test]
    fn test_cover_fit_crops_center() {
        // Left half red, right half blue, 800x500 landscape
        let mut wide = RgbaImage::from_pixel(800, 500, Rgba([255, 0, 0, 255]));
        for y in 0..500 {
            for x in 400..800 {
                wide.put_pixel(x, y, Rgba([0, 0, 255, 255]));
            }
        }
        let fitted = cover_fit(&wide, 400, 500);
        assert_eq!(fitted.dimensions(), (400, 500));
        // Center crop keeps both halves, split near the middle
        assert_eq!(*fitted.get_pixel(10, 250), Rgba([255, 0, 0, 255]));
        assert_eq!(*fitted.get_pixel(390, 250), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_faces_differ() {
        let sans = Face::from(FontChoice::Sans);
        let mono = Face::from(FontChoice::Mono);
        let serif = Face::from(FontChoice::Serif);
        assert_eq!(mono.measure("il"), 16);
        assert!(sans.measure("il") < mono.measure("il"));
        assert!(serif.measure("Thank You") > sans.measure("Thank You"));
    }

    #[test]
    fn test_long_names_shrink() {
        let face = Face::from(FontChoice::Mono);
        assert_eq!(fit_unit("Jane", face, NAME_UNIT, 384), 3);
        assert_eq!(fit_unit(&"W".repeat(20), face, NAME_UNIT, 384), 2);
        assert_eq!(fit_unit(&"W".repeat(200), face, NAME_UNIT, 384), 1);
    }

    #[test]
    fn test_ink_columns() {
        assert_eq!(ink_columns(&[0; 8]), None);
        assert_eq!(ink_columns(&[0b0000_0110, 0, 0, 0, 0, 0, 0, 0]), Some((1, 2)));
    }
}
