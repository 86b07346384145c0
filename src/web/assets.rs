// Static assets bundled into the binary
use anyhow::Result;
use image::{ImageBuffer, ImageFormat, Rgba};
use std::io::Cursor;

/// Browser rendition of the track player
pub const DASHBOARD_JS: &str = include_str!("../../static/js/dashboard.js");

pub const NOCOVER_PATH: &str = "/static/img/nocover.png";
pub const DASHBOARD_JS_PATH: &str = "/static/js/dashboard.js";

const NOCOVER_SIZE: u32 = 300;
const BACKGROUND: Rgba<u8> = Rgba([0x2b, 0x2b, 0x2b, 0xff]);
const DISC: Rgba<u8> = Rgba([0x44, 0x44, 0x44, 0xff]);
const LABEL: Rgba<u8> = Rgba([0x4c, 0xaf, 0x50, 0xff]);

/// Render the placeholder cover: a flat disc on a dark square, encoded as PNG
pub fn render_placeholder_cover() -> Result<Vec<u8>> {
    let center = NOCOVER_SIZE as f32 / 2.0;
    let disc_radius = center * 0.8;
    let label_radius = center * 0.25;

    let image = ImageBuffer::from_fn(NOCOVER_SIZE, NOCOVER_SIZE, |x, y| {
        let dx = x as f32 + 0.5 - center;
        let dy = y as f32 + 0.5 - center;
        let distance = (dx * dx + dy * dy).sqrt();
        if distance <= label_radius {
            LABEL
        } else if distance <= disc_radius {
            DISC
        } else {
            BACKGROUND
        }
    });

    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}
