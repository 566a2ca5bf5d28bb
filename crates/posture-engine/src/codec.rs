//! Base64 image payloads in and out of the API.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbImage};
use thiserror::Error;

/// Prefix for JPEG data URIs produced by [`encode_jpeg_data_uri`].
pub const JPEG_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// Image decode/encode failures.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("no image data provided")]
    Empty,

    #[error("invalid base64 image data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid image: {0}")]
    Image(#[from] image::ImageError),
}

/// Decode a base64 image, with or without a `data:<mime>;base64,` prefix.
///
/// Whitespace inside the payload (line-wrapped base64) is tolerated.
pub fn decode_data_uri(payload: &str) -> Result<DynamicImage, CodecError> {
    let trimmed = payload.trim();
    let encoded = match trimmed.split_once(',') {
        Some((header, body)) if header.starts_with("data:") => body,
        _ => trimmed,
    };

    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err(CodecError::Empty);
    }

    let bytes = STANDARD.decode(compact.as_bytes())?;
    Ok(image::load_from_memory(&bytes)?)
}

/// Encode an RGB image as a JPEG data URI.
pub fn encode_jpeg_data_uri(image: &RgbImage, quality: u8) -> Result<String, CodecError> {
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        encoder.encode_image(image)?;
    }

    let mut uri = String::with_capacity(JPEG_DATA_URI_PREFIX.len() + buffer.get_ref().len() * 4 / 3 + 4);
    uri.push_str(JPEG_DATA_URI_PREFIX);
    STANDARD.encode_string(buffer.get_ref(), &mut uri);
    Ok(uri)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb};

    fn png_base64(width: u32, height: u32) -> String {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 100, 50]));
        let mut bytes = Cursor::new(Vec::new());
        img.write_to(&mut bytes, ImageFormat::Png).unwrap();
        STANDARD.encode(bytes.into_inner())
    }

    #[test]
    fn test_decode_with_and_without_prefix() {
        let raw = png_base64(8, 6);
        let plain = decode_data_uri(&raw).unwrap();
        assert_eq!((plain.width(), plain.height()), (8, 6));

        let uri = format!("data:image/png;base64,{raw}");
        let prefixed = decode_data_uri(&uri).unwrap();
        assert_eq!((prefixed.width(), prefixed.height()), (8, 6));
    }

    #[test]
    fn test_decode_tolerates_line_wrapping() {
        let raw = png_base64(4, 4);
        let wrapped: String = raw
            .as_bytes()
            .chunks(16)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join("\n");
        assert!(decode_data_uri(&wrapped).is_ok());
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(decode_data_uri(""), Err(CodecError::Empty)));
        assert!(matches!(decode_data_uri("data:image/png;base64,"), Err(CodecError::Empty)));
        assert!(matches!(decode_data_uri("not base64!!"), Err(CodecError::Base64(_))));
        // Valid base64, not an image
        let text = STANDARD.encode(b"hello world");
        assert!(matches!(decode_data_uri(&text), Err(CodecError::Image(_))));
    }

    #[test]
    fn test_encode_jpeg_data_uri() {
        let img = RgbImage::from_pixel(10, 10, Rgb([0, 255, 0]));
        let uri = encode_jpeg_data_uri(&img, 80).unwrap();
        assert!(uri.starts_with(JPEG_DATA_URI_PREFIX));

        let decoded = decode_data_uri(&uri).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (10, 10));
    }
}
