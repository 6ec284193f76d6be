use crate::error::GeinkError;
use eink_raster::GrayBuffer;
use std::io::Cursor;

/// Encode an 8-bit grayscale buffer as an optimized PNG.
///
/// The first pass uses fast settings; oxipng then picks filters and
/// recompresses. If optimization fails the unoptimized bytes are returned.
pub fn encode_gray_png(gray: &GrayBuffer) -> Result<Vec<u8>, GeinkError> {
    let png_bytes = encode_png(gray)?;

    // Re-compress with oxipng (zopfli + adaptive filter selection)
    let optimized = oxipng::optimize_from_memory(
        &png_bytes,
        &oxipng::Options {
            strip: oxipng::StripChunks::Safe,
            optimize_alpha: false,
            ..Default::default()
        },
    )
    .unwrap_or(png_bytes);
    Ok(optimized)
}

fn dimension(value: usize) -> Result<u32, GeinkError> {
    u32::try_from(value)
        .map_err(|_| GeinkError::PngEncode(format!("dimension {value} exceeds PNG limits")))
}

fn encode_png(gray: &GrayBuffer) -> Result<Vec<u8>, GeinkError> {
    if gray.is_empty() {
        return Err(GeinkError::PngEncode(format!(
            "cannot encode empty {}x{} image",
            gray.width(),
            gray.height()
        )));
    }
    let width = dimension(gray.width())?;
    let height = dimension(gray.height())?;

    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(png::ColorType::Grayscale);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Fast);
        encoder.set_filter(png::FilterType::NoFilter);
        let mut writer = encoder
            .write_header()
            .map_err(|e| GeinkError::PngEncode(e.to_string()))?;
        writer
            .write_image_data(gray.as_slice())
            .map_err(|e| GeinkError::PngEncode(e.to_string()))?;
    }
    Ok(buf.into_inner())
}
