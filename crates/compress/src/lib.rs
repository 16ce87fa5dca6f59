//! Image recompression for the upload pipeline.
//!
//! Decodes any supported image, scales it down to fit the configured
//! bounding box and re-encodes it as JPEG. Decoding and encoding are CPU
//! bound, so the async entry point moves them onto the blocking pool.

use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, GenericImageView};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use pixdrop_protocol::{CompressOptions, SourceFile};

/// Errors produced while compressing an image.
#[derive(Debug, thiserror::Error)]
pub enum CompressError {
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("compression worker failed: {0}")]
    Worker(String),

    #[error("cancelled")]
    Cancelled,
}

impl CompressError {
    /// Returns `true` when compression stopped because its token fired.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Compresses `file` on the blocking pool.
///
/// The token is checked before any work starts and raced against the
/// worker; once it fires the result of the worker is discarded.
pub async fn compress(
    file: &SourceFile,
    options: CompressOptions,
    cancel: &CancellationToken,
) -> Result<SourceFile, CompressError> {
    if cancel.is_cancelled() {
        return Err(CompressError::Cancelled);
    }

    let source = file.clone();
    let worker = tokio::task::spawn_blocking(move || compress_blocking(&source, &options));

    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!(file = %file.name, "compression abandoned");
            Err(CompressError::Cancelled)
        }
        joined = worker => joined.map_err(|e| CompressError::Worker(e.to_string()))?,
    }
}

/// Synchronous compression: decode, bound, re-encode as JPEG.
///
/// Images already inside the bounding box keep their dimensions.
pub fn compress_blocking(
    file: &SourceFile,
    options: &CompressOptions,
) -> Result<SourceFile, CompressError> {
    let img = image::load_from_memory(&file.data).map_err(CompressError::Decode)?;
    let (width, height) = img.dimensions();

    let max_width = options.max_width.max(1);
    let max_height = options.max_height.max(1);
    let bounded = if width > max_width || height > max_height {
        img.resize(max_width, max_height, FilterType::Lanczos3)
    } else {
        img
    };

    // JPEG has no alpha channel and only 8-bit samples.
    let rgb = bounded.to_rgb8();
    let mut out = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut out, options.clamped_quality());
        encoder
            .encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
            .map_err(CompressError::Encode)?;
    }

    debug!(
        file = %file.name,
        from = %format!("{width}x{height}"),
        to = %format!("{}x{}", rgb.width(), rgb.height()),
        original_bytes = file.size(),
        compressed_bytes = out.len(),
        "image compressed"
    );

    Ok(SourceFile::new(output_name(&file.name), out))
}

/// File name of the compressed output: same stem, `.jpg` extension.
pub fn output_name(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("image");
    format!("{stem}.jpg")
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

    use super::*;

    fn png(width: u32, height: u32) -> SourceFile {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        SourceFile::new("holiday.png", buf)
    }

    fn dimensions(file: &SourceFile) -> (u32, u32) {
        image::load_from_memory(&file.data).unwrap().dimensions()
    }

    #[test]
    fn downscales_to_bounding_box_keeping_aspect() {
        let opts = CompressOptions::default();
        let out = compress_blocking(&png(2000, 1000), &opts).unwrap();
        assert_eq!(dimensions(&out), (1000, 500));
        assert_eq!(out.name, "holiday.jpg");
        assert_eq!(out.mime_type(), "image/jpeg");
    }

    #[test]
    fn does_not_upscale_small_images() {
        let opts = CompressOptions::default();
        let out = compress_blocking(&png(200, 100), &opts).unwrap();
        assert_eq!(dimensions(&out), (200, 100));
    }

    #[test]
    fn lower_quality_yields_smaller_output() {
        let src = png(400, 400);
        let high = CompressOptions {
            quality: 95,
            ..CompressOptions::default()
        };
        let low = CompressOptions {
            quality: 10,
            ..CompressOptions::default()
        };
        let big = compress_blocking(&src, &high).unwrap();
        let small = compress_blocking(&src, &low).unwrap();
        assert!(small.size() < big.size());
    }

    #[test]
    fn rejects_non_images() {
        let file = SourceFile::new("notes.txt", b"definitely not pixels".to_vec());
        let err = compress_blocking(&file, &CompressOptions::default()).unwrap_err();
        assert!(matches!(err, CompressError::Decode(_)));
        assert!(!err.is_cancelled());
    }

    #[test]
    fn output_name_replaces_extension() {
        assert_eq!(output_name("a.png"), "a.jpg");
        assert_eq!(output_name("archive.tar.gz"), "archive.tar.jpg");
        assert_eq!(output_name("noext"), "noext.jpg");
        assert_eq!(output_name(""), "image.jpg");
    }

    #[tokio::test]
    async fn async_compress_matches_blocking() {
        let src = png(1200, 1200);
        let out = compress(&src, CompressOptions::default(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(dimensions(&out), (1000, 1000));
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = compress(&png(10, 10), CompressOptions::default(), &cancel)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }
}
