//! End-to-end tests for the single-file pipeline stages.

mod common;

use common::*;
use eink_raster::{unpack, EpdEncoder, GrayBuffer, KernelId, Levels};
use geink::models::{AppConfig, ConfigLayer};
use geink::services::image_io::load_gray;
use geink::services::pipeline::{convert_output_path, dither_output_path, preprocess_output_path};
use geink::services::{convert_file, dither_file, preprocess_file, HeaderTarget};
use pretty_assertions::assert_eq;

#[test]
fn test_full_chain_photo_to_bin() {
    let dir = workspace();
    let config = config(80, 48, 2);
    let photo = write_rgb(dir.path(), "photo.png", &noisy_photo(333, 200));

    let crop = preprocess_output_path(&photo);
    preprocess_file(&photo, &crop, &config).unwrap();
    assert_eq!(crop.file_name().unwrap(), "photo_crop.png");
    let gray = load_gray(&crop).unwrap();
    assert_eq!((gray.width(), gray.height()), (80, 48));

    let dithered = dither_output_path(&crop);
    dither_file(&crop, &dithered, &config).unwrap();
    assert_eq!(dithered.file_name().unwrap(), "photo_dithered.png");
    let preview = load_gray(&dithered).unwrap();
    assert!(preview.as_slice().iter().all(|&v| v == 0 || v == 255));

    let bin = convert_output_path(&dithered, None);
    let outcome = convert_file(&dithered, &bin, &config, None).unwrap();
    assert_eq!(bin.file_name().unwrap(), "photo.bin");
    assert_eq!(outcome.size, 80 * 48 / 8);
    assert_eq!(std::fs::read(&bin).unwrap().len(), 480);
    assert_eq!(outcome.header, None);
}

#[test]
fn test_panel_sized_artifacts() {
    let dir = workspace();
    let input = write_gray(
        dir.path(),
        "panel_dithered.png",
        &gradient(PANEL_WIDTH, PANEL_HEIGHT),
    );

    for (levels, expected) in [(2, 48_000), (4, 96_000)] {
        let bin = dir.path().join(format!("panel_{levels}.bin"));
        let outcome =
            convert_file(&input, &bin, &config(PANEL_WIDTH, PANEL_HEIGHT, levels), None).unwrap();
        assert_eq!(outcome.size, expected);
        assert_eq!(std::fs::metadata(&bin).unwrap().len(), expected as u64);
    }
}

#[test]
fn test_convert_recovers_dithered_levels() {
    let dir = workspace();
    let config = config(64, 32, 4);
    let source = write_gray(dir.path(), "ramp_crop.png", &gradient(64, 32));
    let dithered = dir.path().join("ramp_dithered.png");
    dither_file(&source, &dithered, &config).unwrap();

    let preview = load_gray(&dithered).unwrap();
    assert!(preview
        .as_slice()
        .iter()
        .all(|v| [0, 85, 170, 255].contains(v)));

    let bin = dir.path().join("ramp.bin");
    convert_file(&dithered, &bin, &config, None).unwrap();

    let gray = load_gray(&source).unwrap();
    let expected = config.encoder().encode(&gray).unwrap();
    assert_eq!(std::fs::read(&bin).unwrap(), expected.as_bytes());

    let levels = unpack(&std::fs::read(&bin).unwrap(), 64, 32, 2).unwrap();
    assert_eq!(levels, config.encoder().dither(&gray).unwrap());
}

#[test]
fn test_convert_resizes_mismatched_input() {
    let dir = workspace();
    let input = write_gray(dir.path(), "small_dithered.png", &gradient(400, 240));
    let bin = dir.path().join("small.bin");

    let outcome = convert_file(&input, &bin, &config(PANEL_WIDTH, PANEL_HEIGHT, 2), None).unwrap();
    assert_eq!(outcome.size, 48_000);
}

#[test]
fn test_convert_writes_header() {
    let dir = workspace();
    let headers = dir.path().join("ESPSlider");
    let input = write_gray(dir.path(), "cat_dithered.png", &gradient(16, 2));
    let bin = convert_output_path(&input, None);
    let target = HeaderTarget {
        dir: headers.clone(),
        invert: false,
    };

    let outcome = convert_file(&input, &bin, &config(16, 2, 2), Some(&target)).unwrap();
    assert_eq!(
        outcome.header,
        Some(("cat.h".to_string(), "cat_data".to_string()))
    );

    let text = std::fs::read_to_string(headers.join("cat.h")).unwrap();
    let bytes = std::fs::read(&bin).unwrap();
    assert_eq!(bytes.len(), 4);
    assert!(text.starts_with("#ifndef CAT_DATA_H\n#define CAT_DATA_H\n"));
    assert!(text.contains("#include <pgmspace.h>"));
    assert!(text.contains("#define CAT_DATA_LEN 4"));
    assert!(text.contains("const uint8_t cat_data[4] PROGMEM = {"));
    let expected_row = bytes
        .iter()
        .map(|b| format!("0x{b:02X}"))
        .collect::<Vec<_>>()
        .join(", ");
    assert!(text.contains(&format!("    {expected_row},")));
}

#[test]
fn test_convert_inverted_header() {
    let dir = workspace();
    let input = write_gray(
        dir.path(),
        "white_dithered.png",
        &image::GrayImage::from_pixel(8, 1, image::Luma([255])),
    );
    let bin = dir.path().join("white.bin");
    let target = HeaderTarget {
        dir: dir.path().to_path_buf(),
        invert: true,
    };

    convert_file(&input, &bin, &config(8, 1, 2), Some(&target)).unwrap();
    assert_eq!(std::fs::read(&bin).unwrap(), vec![0xFF]);
    let text = std::fs::read_to_string(dir.path().join("white.h")).unwrap();
    assert!(text.contains("    0x00,"));
}

#[test]
fn test_dither_methods_differ() {
    let dir = workspace();
    let source = write_gray(dir.path(), "g_crop.png", &gradient(48, 24));
    let mut outputs = Vec::new();
    for kernel in KernelId::ALL {
        let config = AppConfig::new(48, 24, 2, kernel).unwrap();
        let out = dir.path().join(format!("g_{kernel}.png"));
        dither_file(&source, &out, &config).unwrap();
        outputs.push(load_gray(&out).unwrap());
    }
    assert_ne!(outputs[0], outputs[1]);
    assert_ne!(outputs[0], outputs[2]);
}

#[test]
fn test_unknown_method_is_a_config_error() {
    let cli = ConfigLayer {
        method: Some("invalid_method".into()),
        ..Default::default()
    };
    let err =
        AppConfig::from_layers(ConfigLayer::default(), ConfigLayer::default(), cli).unwrap_err();
    assert_eq!(err.to_string(), "unsupported dithering method: invalid_method");
}

#[test]
fn test_config_file_drives_pipeline() {
    let dir = workspace();
    let yaml = dir.path().join("geink.yaml");
    std::fs::write(&yaml, "width: 32\nheight: 16\ncolor_levels: 16\nmethod: stucki\n").unwrap();

    let file = ConfigLayer::from_file(&yaml).unwrap();
    let config =
        AppConfig::from_layers(file, ConfigLayer::default(), ConfigLayer::default()).unwrap();
    assert_eq!(config.kernel(), KernelId::Stucki);
    assert_eq!(config.levels(), Levels::new(16).unwrap());

    let input = write_gray(dir.path(), "x_dithered.png", &gradient(32, 16));
    let outcome = convert_file(&input, &dir.path().join("x.bin"), &config, None).unwrap();
    assert_eq!(outcome.size, 32 * 16 * 4 / 8);
}

#[test]
fn test_missing_input_fails() {
    let dir = workspace();
    let missing = dir.path().join("nope_crop.png");
    let err = dither_file(&missing, &dir.path().join("out.png"), &config(8, 8, 2)).unwrap_err();
    assert_eq!(err.kind(), geink::error::ErrorKind::Io);
}

#[test]
fn test_encoder_matches_dither_stage() {
    let gray = GrayBuffer::new(4, 1, vec![0, 100, 200, 255]).unwrap();
    let levels = EpdEncoder::new(Levels::BW).dither(&gray).unwrap();
    assert_eq!(levels.as_slice()[0], 0);
    assert_eq!(levels.as_slice()[3], 1);
}

#[test]
fn test_grid_writes_tiles_next_to_input() {
    let dir = workspace();
    let input = write_rgb(dir.path(), "poster.png", &noisy_photo(100, 50));

    let tiles = geink::services::grid_file(&input, 2, 3).unwrap();
    assert_eq!(tiles.len(), 6);
    assert_eq!(
        file_names(&tiles),
        vec!["r0_c0.png", "r0_c1.png", "r0_c2.png", "r1_c0.png", "r1_c1.png", "r1_c2.png"]
    );

    let tile_dir = dir.path().join("poster");
    let last = image::open(tile_dir.join("r1_c2.png")).unwrap();
    assert_eq!((last.width(), last.height()), (34, 25));
    let first = image::open(tile_dir.join("r0_c0.png")).unwrap();
    assert_eq!((first.width(), first.height()), (33, 25));
}

#[test]
fn test_grid_rejects_more_rows_than_pixels() {
    let dir = workspace();
    let input = write_rgb(dir.path(), "tiny.png", &noisy_photo(4, 4));
    let err = geink::services::grid_file(&input, 5, 1).unwrap_err();
    assert_eq!(err.kind(), geink::error::ErrorKind::Validation);
}
