//! In-memory fixture images for pipeline tests.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

/// Deterministic textured RGB pattern; compresses poorly enough to give
/// meaningful encoder output sizes.
pub fn textured_rgb(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let n = x.wrapping_mul(37) ^ y.wrapping_mul(91) ^ (x * y);
        Rgb([(n % 256) as u8, ((x * 255) / width.max(1)) as u8, ((y * 255) / height.max(1)) as u8])
    })
}

pub fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, format).unwrap();
    buffer.into_inner()
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(DynamicImage::ImageRgb8(textured_rgb(width, height)), ImageFormat::Jpeg)
}

pub fn png_rgb(width: u32, height: u32) -> Vec<u8> {
    encode(DynamicImage::ImageRgb8(textured_rgb(width, height)), ImageFormat::Png)
}

/// RGBA PNG: left half fully transparent, right half opaque texture.
pub fn png_rgba(width: u32, height: u32) -> Vec<u8> {
    encode(DynamicImage::ImageRgba8(half_transparent(width, height)), ImageFormat::Png)
}

pub fn gif(width: u32, height: u32) -> Vec<u8> {
    let rgba = DynamicImage::ImageRgb8(textured_rgb(width, height)).to_rgba8();
    encode(DynamicImage::ImageRgba8(rgba), ImageFormat::Gif)
}

pub fn bmp(width: u32, height: u32) -> Vec<u8> {
    encode(DynamicImage::ImageRgb8(textured_rgb(width, height)), ImageFormat::Bmp)
}

pub fn webp(width: u32, height: u32) -> Vec<u8> {
    let rgba = DynamicImage::ImageRgb8(textured_rgb(width, height)).to_rgba8();
    encode(DynamicImage::ImageRgba8(rgba), ImageFormat::WebP)
}

/// GIF with the same transparent left half as [`png_rgba`].
pub fn gif_rgba(width: u32, height: u32) -> Vec<u8> {
    encode(DynamicImage::ImageRgba8(half_transparent(width, height)), ImageFormat::Gif)
}

/// Lossless WebP with the same transparent left half as [`png_rgba`].
pub fn webp_rgba(width: u32, height: u32) -> Vec<u8> {
    encode(DynamicImage::ImageRgba8(half_transparent(width, height)), ImageFormat::WebP)
}

pub fn half_transparent(width: u32, height: u32) -> RgbaImage {
    let texture = textured_rgb(width, height);
    RgbaImage::from_fn(width, height, |x, y| {
        if x < width / 2 {
            Rgba([255, 255, 255, 0])
        } else {
            let Rgb([r, g, b]) = *texture.get_pixel(x, y);
            Rgba([r, g, b, 255])
        }
    })
}
