/// Color utilities for card rendering
///
/// This module handles:
/// - Parsing the text color typed by the user (`#rgb`, `#rrggbb`, `#rrggbbaa`)
/// - Straight-alpha "over" compositing used for the overlay and the glyphs
use image::Rgba;

/// Default text color
pub const DEFAULT_TEXT_COLOR: &str = "#ffffff";

/// Dark legibility overlay: black at 40% opacity
pub const OVERLAY: Rgba<u8> = Rgba([0, 0, 0, 102]);

/// Parse a hex color string. Surrounding whitespace is ignored.
pub fn parse_hex(value: &str) -> Option<Rgba<u8>> {
    let hex = value.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    // "f" -> 0xff
    let short = |i: usize| channel(i..i + 1).map(|v| v * 17);

    match hex.len() {
        3 => Some(Rgba([short(0)?, short(1)?, short(2)?, 255])),
        6 => Some(Rgba([channel(0..2)?, channel(2..4)?, channel(4..6)?, 255])),
        8 => Some(Rgba([
            channel(0..2)?,
            channel(2..4)?,
            channel(4..6)?,
            channel(6..8)?,
        ])),
        _ => None,
    }
}

/// Text color for a user-entered value.
///
/// Anything unparseable renders with the default, the way a browser
/// ignores an invalid CSS color.
pub fn text_color(value: &str) -> Rgba<u8> {
    parse_hex(value).unwrap_or(Rgba([255, 255, 255, 255]))
}

/// Composite `src` over `dst` (both straight alpha)
pub fn blend_over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let sa = f32::from(src[3]) / 255.0;
    if sa <= 0.0 {
        return dst;
    }
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let mix = |s: u8, d: u8| {
        let c = (f32::from(s) * sa + f32::from(d) * da * (1.0 - sa)) / out_a;
        c.round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        mix(src[0], dst[0]),
        mix(src[1], dst[1]),
        mix(src[2], dst[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}
