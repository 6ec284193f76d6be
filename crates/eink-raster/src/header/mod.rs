//! C header rendering for firmware that embeds images in flash.
//!
//! The emitted headers target Arduino-style toolchains: arrays are marked
//! `PROGMEM` and `<pgmspace.h>` is included alongside `<stdint.h>`.

use crate::api::RasterError;
use std::fmt::Write;

/// Options for [`emit_header`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderOptions {
    /// Array entries per output line. Zero is treated as one.
    pub bytes_per_line: usize,
    /// Write `!byte` instead of `byte`. ESPSlider 7.5 V2 panels expect
    /// inverted data.
    pub invert: bool,
    /// Written into a `// Source:` comment when set.
    pub source_name: Option<String>,
}

impl Default for HeaderOptions {
    fn default() -> Self {
        Self {
            bytes_per_line: 12,
            invert: false,
            source_name: None,
        }
    }
}

fn guard_name(symbol: &str) -> String {
    format!("{}_H", symbol.to_ascii_uppercase())
}

fn format_kib(len: usize) -> String {
    format!("{:.1}", len as f64 / 1024.0)
}

/// Render `bytes` as a C header declaring `const uint8_t <symbol>[]`.
///
/// `symbol` must already be a valid C identifier; see [`symbol_for_stem`].
///
/// # Errors
///
/// [`RasterError::EmptyBuffer`] for an empty `bytes`, since C has no
/// zero-length arrays.
///
/// # Example
///
/// ```
/// use eink_raster::{emit_header, HeaderOptions};
///
/// let text = emit_header(&[0x00, 0xFF], "logo_data", &HeaderOptions::default()).unwrap();
/// assert!(text.contains("#define LOGO_DATA_LEN 2"));
/// assert!(text.contains("const uint8_t logo_data[2] PROGMEM = {"));
/// assert!(text.contains("    0x00, 0xFF,"));
/// ```
pub fn emit_header(
    bytes: &[u8],
    symbol: &str,
    options: &HeaderOptions,
) -> Result<String, RasterError> {
    if bytes.is_empty() {
        return Err(RasterError::EmptyBuffer {
            width: 0,
            height: 0,
        });
    }
    let guard = guard_name(symbol);
    let len = bytes.len();
    let per_line = options.bytes_per_line.max(1);

    let mut out = String::with_capacity(len * 6 + 512);
    out.push_str(&format!("#ifndef {guard}\n#define {guard}\n\n"));
    out.push_str("#include <stdint.h>\n#include <pgmspace.h>\n\n");
    out.push_str(&format!("// Size: {len} bytes ({} KB)\n", format_kib(len)));
    if let Some(source) = &options.source_name {
        out.push_str(&format!("// Source: {source}\n"));
    }
    if options.invert {
        out.push_str("// Data pre-inverted (~byte) for ESPSlider 7.5 V2\n");
    }
    out.push_str(&format!(
        "#define {}_LEN {len}\n\n",
        symbol.to_ascii_uppercase()
    ));
    out.push_str("// Stored in Flash using PROGMEM\n");
    out.push_str(&format!("const uint8_t {symbol}[{len}] PROGMEM = {{\n"));

    for chunk in bytes.chunks(per_line) {
        let line = chunk
            .iter()
            .map(|&b| format!("0x{:02X}", if options.invert { !b } else { b }))
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str("    ");
        out.push_str(&line);
        out.push_str(",\n");
    }

    out.push_str("};\n\n");
    out.push_str(&format!("#endif // {guard}\n"));
    Ok(out)
}

/// Derive a C array name from a file stem.
///
/// ASCII letters and digits are kept, other ASCII characters become `_`
/// and non-ASCII characters are spelled as `u<hex code point>`. Runs of
/// `_` are collapsed and trimmed, so the name never starts with `_` or
/// holds `__`. A name that would be empty or start with a digit gets an
/// `img_` prefix. The result always ends in `_data`.
///
/// Distinct stems can still map to one symbol (`a-b` and `a_b`); callers
/// emitting several headers must check for that.
///
/// ```
/// use eink_raster::symbol_for_stem;
///
/// assert_eq!(symbol_for_stem("image1"), "image1_data");
/// assert_eq!(symbol_for_stem("my-photo.v2"), "my_photo_v2_data");
/// assert_eq!(symbol_for_stem("01"), "img_01_data");
/// assert_eq!(symbol_for_stem("图片_4"), "u56fe_u7247_4_data");
/// ```
pub fn symbol_for_stem(stem: &str) -> String {
    let mut raw = String::with_capacity(stem.len() + 8);
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() {
            raw.push(c);
        } else if c.is_ascii() {
            raw.push('_');
        } else {
            let _ = write!(raw, "_u{:04x}_", c as u32);
        }
    }

    let mut symbol = String::with_capacity(raw.len() + 9);
    for part in raw.split('_').filter(|p| !p.is_empty()) {
        if !symbol.is_empty() {
            symbol.push('_');
        }
        symbol.push_str(part);
    }
    if symbol.is_empty() || symbol.starts_with(|c: char| c.is_ascii_digit()) {
        symbol.insert_str(0, if symbol.is_empty() { "img" } else { "img_" });
    }
    symbol.push_str("_data");
    symbol
}

/// Render an `images.h` index over per-image headers.
///
/// `entries` pairs each header file name (e.g. `"image1.h"`) with the
/// array symbol it declares. Every image is assumed to be `image_size`
/// bytes, which holds when all were packed for one display.
pub fn emit_index(entries: &[(String, String)], image_size: usize) -> String {
    let count = entries.len();
    let mut out = String::with_capacity(512 + count * 64);
    out.push_str("#ifndef IMAGES_H\n#define IMAGES_H\n\n");
    out.push_str("#include <stdint.h>\n#include <pgmspace.h>\n\n");
    out.push_str(&format!(
        "// Auto-generated: {count} images, {image_size} bytes each\n"
    ));
    out.push_str(&format!("#define IMAGE_COUNT {count}\n"));
    out.push_str(&format!("#define IMAGE_SIZE {image_size}\n\n"));

    for (file, _) in entries {
        out.push_str(&format!("#include \"{file}\"\n"));
    }
    out.push('\n');

    out.push_str("struct ImageInfo {\n    const uint8_t* data;\n    size_t size;\n};\n\n");
    out.push_str("const ImageInfo images[IMAGE_COUNT] PROGMEM = {\n");
    for (_, symbol) in entries {
        out.push_str(&format!("    {{{symbol}, IMAGE_SIZE}},\n"));
    }
    out.push_str("};\n\n#endif // IMAGES_H\n");
    out
}
