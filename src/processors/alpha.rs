// pulp-image/src/processors/alpha.rs
use image::{DynamicImage, Rgb, RgbImage};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Parses `#rgb` or `#rrggbb`; anything else falls back to opaque white.
pub fn parse_background(color: &str) -> Rgb<u8> {
    let Some(hex) = color.trim().strip_prefix('#') else {
        return WHITE;
    };
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return WHITE;
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    let parsed = match hex.len() {
        3 => {
            let doubled: Vec<String> = hex.chars().map(|c| format!("{c}{c}")).collect();
            (channel(&doubled[0]), channel(&doubled[1]), channel(&doubled[2]))
        }
        6 => (channel(&hex[0..2]), channel(&hex[2..4]), channel(&hex[4..6])),
        _ => return WHITE,
    };

    match parsed {
        (Some(r), Some(g), Some(b)) => Rgb([r, g, b]),
        _ => WHITE,
    }
}

pub struct Flattener {
    background: Rgb<u8>,
}

impl Flattener {
    pub fn new(background: Rgb<u8>) -> Self {
        Self { background }
    }

    /// Composites the image over the background colour, dropping alpha.
    pub fn flatten(&self, image: &DynamicImage) -> DynamicImage {
        let rgba = image.to_rgba8();
        let Rgb([bg_r, bg_g, bg_b]) = self.background;

        let flattened = RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
            let [r, g, b, a] = rgba.get_pixel(x, y).0;
            let alpha = a as u32;
            let blend = |fg: u8, bg: u8| -> u8 {
                ((fg as u32 * alpha + bg as u32 * (255 - alpha) + 127) / 255) as u8
            };
            Rgb([blend(r, bg_r), blend(g, bg_g), blend(b, bg_b)])
        });

        log::debug!(
            "Flattened {}x{} image onto #{:02x}{:02x}{:02x}",
            flattened.width(),
            flattened.height(),
            bg_r,
            bg_g,
            bg_b
        );
        DynamicImage::ImageRgb8(flattened)
    }
}
