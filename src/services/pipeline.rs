//! Per-file pipeline stages and their directory-mode counterparts.
//!
//! Stages communicate through files on disk, following a naming chain:
//!
//! ```text
//! photo.jpg --preprocess--> photo_crop.jpg --dither--> photo_dithered.jpg --convert--> photo.bin
//! ```

use crate::error::GeinkError;
use crate::models::AppConfig;
use crate::services::batch::{run_batch, BatchReport};
use crate::services::{image_io, preprocess};
use eink_raster::{emit_header, emit_index, pack, symbol_for_stem, GrayBuffer, HeaderOptions};
use image::imageops::{self, FilterType};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

pub const CROP_MARKER: &str = "_crop";
pub const DITHERED_MARKER: &str = "_dithered";

/// Extensions `convert` accepts in directory mode.
pub const CONVERT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

pub const INDEX_HEADER: &str = "images.h";

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn suffix(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}

fn name_contains(path: &Path, marker: &str) -> bool {
    path.file_name()
        .is_some_and(|n| n.to_string_lossy().contains(marker))
}

/// `dir/photo.jpg` -> `dir/photo_crop.jpg`
pub fn preprocess_output_path(input: &Path) -> PathBuf {
    input.with_file_name(format!("{}{CROP_MARKER}{}", stem(input), suffix(input)))
}

/// `dir/photo_crop.jpg` -> `dir/photo_dithered.jpg`
///
/// A stem without `_crop` gets `_dithered` appended, so the output never
/// overwrites the input.
pub fn dither_output_path(input: &Path) -> PathBuf {
    let stem = stem(input);
    let new_stem = if stem.contains(CROP_MARKER) {
        stem.replace(CROP_MARKER, DITHERED_MARKER)
    } else {
        format!("{stem}{DITHERED_MARKER}")
    };
    input.with_file_name(format!("{new_stem}{}", suffix(input)))
}

/// `photo_dithered.png` -> `<out_dir>/photo.bin`, `out_dir` defaulting to
/// the input's directory.
pub fn convert_output_path(input: &Path, out_dir: Option<&Path>) -> PathBuf {
    let name = format!("{}.bin", stem(input).replace(DITHERED_MARKER, ""));
    match out_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

/// Where and how to write firmware headers during `convert`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderTarget {
    pub dir: PathBuf,
    pub invert: bool,
}

/// Result of a directory-mode `convert`.
#[derive(Debug)]
pub struct ConvertBatch {
    pub report: BatchReport<ConvertOutcome>,
    /// Path of the written `images.h`. `Ok(None)` when headers were off or
    /// nothing converted.
    pub index: Result<Option<PathBuf>, GeinkError>,
}

/// Result of converting one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOutcome {
    pub bin_path: PathBuf,
    pub size: usize,
    /// `(header file name, array symbol)` when a header was written.
    pub header: Option<(String, String)>,
}

pub fn preprocess_file(
    input: &Path,
    output: &Path,
    config: &AppConfig,
) -> Result<PathBuf, GeinkError> {
    tracing::info!(input = %input.display(), output = %output.display(), "Preprocessing");
    let img = image_io::open_image(input)?;
    let gray = preprocess::preprocess_image(&img, config)?;
    image_io::save_gray(&gray, output)?;
    tracing::info!(
        output = %output.display(),
        width = gray.width(),
        height = gray.height(),
        "Saved preprocessed image"
    );
    Ok(output.to_path_buf())
}

/// Dither `input` and write a viewable image with each level expanded to
/// `round(level * 255 / (L - 1))`.
pub fn dither_file(input: &Path, output: &Path, config: &AppConfig) -> Result<PathBuf, GeinkError> {
    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        method = %config.kernel(),
        levels = config.levels().count(),
        "Dithering"
    );
    let gray = image_io::load_gray(input)?;
    let encoder = config.encoder();
    let levels = encoder.dither(&gray)?;
    let preview = encoder.preview(&levels);
    image_io::save_gray(&preview, output)?;

    let histogram = levels.histogram();
    tracing::debug!(?histogram, "Level distribution");
    Ok(output.to_path_buf())
}

fn fit_to_target(gray: GrayBuffer, config: &AppConfig, input: &Path) -> Result<GrayBuffer, GeinkError> {
    let (w, h) = (config.width() as usize, config.height() as usize);
    if gray.width() == w && gray.height() == h {
        return Ok(gray);
    }
    tracing::warn!(
        input = %input.display(),
        actual = %format_args!("{}x{}", gray.width(), gray.height()),
        expected = %format_args!("{w}x{h}"),
        "Image size does not match target, resizing"
    );
    if gray.is_empty() {
        return Err(eink_raster::RasterError::EmptyBuffer {
            width: gray.width(),
            height: gray.height(),
        }
        .into());
    }
    let img = image_io::image_from_gray(&gray)?;
    let resized = imageops::resize(&img, config.width(), config.height(), FilterType::Nearest);
    image_io::gray_from_image(resized).map_err(Into::into)
}

/// Pack an already dithered image into a `.bin` artifact.
///
/// Samples are mapped to their nearest level without diffusion, so a
/// `dither` output converts back to exactly the levels it was made from.
/// With `header`, a `<bin stem>.h` is written into `header.dir`.
pub fn convert_file(
    input: &Path,
    output: &Path,
    config: &AppConfig,
    header: Option<&HeaderTarget>,
) -> Result<ConvertOutcome, GeinkError> {
    let gray = fit_to_target(image_io::load_gray(input)?, config, input)?;
    let levels = config.encoder().requantize(&gray)?;
    let artifact = pack(&levels, config.levels().bits_per_pixel())?;

    let expected = config.artifact_len();
    if artifact.len() != expected {
        return Err(eink_raster::RasterError::SizeMismatch {
            expected,
            actual: artifact.len(),
        }
        .into());
    }

    image_io::write_bytes(output, artifact.as_bytes())?;
    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        bytes = artifact.len(),
        bits = artifact.bits(),
        "Converted"
    );

    let header = match header {
        Some(target) => Some(write_header(output, artifact.as_bytes(), target)?),
        None => None,
    };

    Ok(ConvertOutcome {
        bin_path: output.to_path_buf(),
        size: artifact.len(),
        header,
    })
}

/// Write `<stem of bin_path>.h` into `target.dir`, returning the file name
/// and array symbol.
pub fn write_header(
    bin_path: &Path,
    bytes: &[u8],
    target: &HeaderTarget,
) -> Result<(String, String), GeinkError> {
    let stem = stem(bin_path);
    let symbol = symbol_for_stem(&stem);
    let file_name = format!("{stem}.h");
    let options = HeaderOptions {
        invert: target.invert,
        source_name: bin_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned()),
        ..HeaderOptions::default()
    };
    let text = emit_header(bytes, &symbol, &options)?;
    let path = target.dir.join(&file_name);
    image_io::write_bytes(&path, text.as_bytes())?;
    tracing::info!(header = %path.display(), symbol = %symbol, "Generated header");
    Ok((file_name, symbol))
}

pub fn write_index(
    dir: &Path,
    entries: &[(String, String)],
    image_size: usize,
) -> Result<PathBuf, GeinkError> {
    let path = dir.join(INDEX_HEADER);
    image_io::write_bytes(&path, emit_index(entries, image_size).as_bytes())?;
    tracing::info!(index = %path.display(), images = entries.len(), "Generated image index");
    Ok(path)
}

/// Preprocess every image in `dir`, writing `_crop` siblings.
pub fn preprocess_dir(dir: &Path, config: &AppConfig) -> Result<BatchReport<PathBuf>, GeinkError> {
    let inputs = image_io::list_images(dir, |_| true)?;
    Ok(run_batch(inputs, |input| {
        preprocess_file(input, &preprocess_output_path(input), config)
    }))
}

/// Dither every `_crop` image in `dir`.
pub fn dither_dir(dir: &Path, config: &AppConfig) -> Result<BatchReport<PathBuf>, GeinkError> {
    let inputs = image_io::list_images(dir, |p| name_contains(p, CROP_MARKER))?;
    Ok(run_batch(inputs, |input| {
        dither_file(input, &dither_output_path(input), config)
    }))
}

/// Find inputs that would write the same `.bin` or, with headers on, the
/// same array symbol or include guard as another input.
///
/// Every member of a clashing group is mapped to its error message.
fn output_clashes(
    inputs: &[PathBuf],
    out_dir: Option<&Path>,
    headers: bool,
) -> HashMap<PathBuf, String> {
    let mut owners: BTreeMap<String, Vec<&PathBuf>> = BTreeMap::new();
    for input in inputs {
        let bin = convert_output_path(input, out_dir);
        owners
            .entry(format!("output {}", bin.display()))
            .or_default()
            .push(input);
        if headers {
            let guard = symbol_for_stem(&stem(&bin)).to_ascii_uppercase();
            owners
                .entry(format!("header symbol {guard}"))
                .or_default()
                .push(input);
        }
    }

    let mut clashes = HashMap::new();
    for (what, group) in owners.iter().filter(|(_, g)| g.len() > 1) {
        for &input in group {
            let others: Vec<String> = group
                .iter()
                .filter(|&&other| other != input)
                .map(|other| other.display().to_string())
                .collect();
            clashes.entry(input.clone()).or_insert_with(|| {
                format!("{what} is also produced by {}", others.join(", "))
            });
        }
    }
    clashes
}

/// Convert every `_dithered` image in `dir` into `out_dir`.
///
/// Inputs whose outputs would collide fail as validation errors before
/// any of them is written. With `header`, each success also gets a header,
/// and an `images.h` index over all successes is written once the batch
/// finishes.
pub fn convert_dir(
    dir: &Path,
    out_dir: Option<&Path>,
    config: &AppConfig,
    header: Option<&HeaderTarget>,
) -> Result<ConvertBatch, GeinkError> {
    let inputs = image_io::list_images(dir, |p| {
        name_contains(p, DITHERED_MARKER) && image_io::has_extension(p, CONVERT_EXTENSIONS)
    })?;
    let clashes = output_clashes(&inputs, out_dir, header.is_some());
    let report = run_batch(inputs, |input| {
        if let Some(message) = clashes.get(input) {
            return Err(GeinkError::Validation(message.clone()));
        }
        convert_file(input, &convert_output_path(input, out_dir), config, header)
    });

    let index = match header {
        Some(target) => {
            let entries: Vec<(String, String)> = report
                .succeeded
                .iter()
                .filter_map(|(_, outcome)| outcome.header.clone())
                .collect();
            if entries.is_empty() {
                Ok(None)
            } else {
                write_index(&target.dir, &entries, config.artifact_len()).map(Some)
            }
        }
        None => Ok(None),
    };
    Ok(ConvertBatch { report, index })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_preprocess_output_path() {
        assert_eq!(
            preprocess_output_path(Path::new("/in/photo.jpg")),
            PathBuf::from("/in/photo_crop.jpg")
        );
        assert_eq!(
            preprocess_output_path(Path::new("noext")),
            PathBuf::from("noext_crop")
        );
    }

    #[test]
    fn test_dither_output_path() {
        assert_eq!(
            dither_output_path(Path::new("/in/photo_crop.png")),
            PathBuf::from("/in/photo_dithered.png")
        );
        assert_eq!(
            dither_output_path(Path::new("/in/plain.png")),
            PathBuf::from("/in/plain_dithered.png")
        );
    }

    #[test]
    fn test_convert_output_path() {
        assert_eq!(
            convert_output_path(Path::new("/in/photo_dithered.png"), None),
            PathBuf::from("/in/photo.bin")
        );
        assert_eq!(
            convert_output_path(Path::new("/in/photo_dithered.png"), Some(Path::new("/out"))),
            PathBuf::from("/out/photo.bin")
        );
    }

    #[test]
    fn test_name_contains_marker() {
        assert!(name_contains(Path::new("/a/x_crop.png"), CROP_MARKER));
        assert!(!name_contains(Path::new("/a_crop/x.png"), CROP_MARKER));
    }

    #[test]
    fn test_output_clashes_groups_by_bin_and_symbol() {
        let inputs: Vec<PathBuf> = [
            "/in/photo_dithered.png",
            "/in/photo_dithered.jpg",
            "/in/a-b_dithered.png",
            "/in/a_b_dithered.png",
            "/in/Cat_dithered.png",
            "/in/cat_dithered.png",
            "/in/solo_dithered.png",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();

        let without_headers = output_clashes(&inputs, None, false);
        let mut names: Vec<_> = without_headers.keys().cloned().collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                PathBuf::from("/in/photo_dithered.jpg"),
                PathBuf::from("/in/photo_dithered.png")
            ]
        );
        assert_eq!(
            without_headers[Path::new("/in/photo_dithered.png")],
            "output /in/photo.bin is also produced by /in/photo_dithered.jpg"
        );

        let with_headers = output_clashes(&inputs, None, true);
        assert_eq!(with_headers.len(), 6);
        assert!(!with_headers.contains_key(Path::new("/in/solo_dithered.png")));
        assert!(with_headers[Path::new("/in/cat_dithered.png")].contains("CAT_DATA"));
    }

    #[test]
    fn test_write_header_names_from_stem() {
        let dir = tempfile::tempdir().unwrap();
        let target = HeaderTarget {
            dir: dir.path().to_path_buf(),
            invert: false,
        };
        let (file, symbol) = write_header(Path::new("/out/cat-01.bin"), &[0xAB], &target).unwrap();
        assert_eq!(file, "cat-01.h");
        assert_eq!(symbol, "cat_01_data");

        let text = std::fs::read_to_string(dir.path().join("cat-01.h")).unwrap();
        assert!(text.contains("// Source: cat-01.bin"));
        assert!(text.contains("const uint8_t cat_01_data[1] PROGMEM"));
        assert!(text.contains("    0xAB,"));
    }
}
