//! Directory mode: file selection, per-item failures and the header index.

mod common;

use common::*;
use geink::services::pipeline::INDEX_HEADER;
use geink::services::{convert_dir, dither_dir, preprocess_dir, HeaderTarget};
use pretty_assertions::assert_eq;

#[test]
fn test_preprocess_dir_processes_every_image() {
    let dir = workspace();
    write_rgb(dir.path(), "a.png", &noisy_photo(120, 90));
    write_rgb(dir.path(), "b.jpg", &noisy_photo(90, 120));
    std::fs::write(dir.path().join("notes.txt"), "not an image").unwrap();

    let report = preprocess_dir(dir.path(), &config(40, 24, 2)).unwrap();
    assert_eq!(report.total(), 2);
    assert!(report.failed.is_empty());

    let outputs: Vec<_> = report.succeeded.into_iter().map(|(_, out)| out).collect();
    assert_eq!(file_names(&outputs), vec!["a_crop.png", "b_crop.jpg"]);
}

#[test]
fn test_dither_dir_only_picks_crop_files() {
    let dir = workspace();
    write_gray(dir.path(), "one_crop.png", &gradient(16, 8));
    write_gray(dir.path(), "two_crop.png", &gradient(16, 8));
    write_gray(dir.path(), "raw.png", &gradient(16, 8));

    let report = dither_dir(dir.path(), &config(16, 8, 2)).unwrap();
    let outputs: Vec<_> = report.succeeded.into_iter().map(|(_, out)| out).collect();
    assert_eq!(
        file_names(&outputs),
        vec!["one_dithered.png", "two_dithered.png"]
    );
    assert!(!dir.path().join("raw_dithered.png").exists());
}

#[test]
fn test_corrupt_file_does_not_stop_batch() {
    let dir = workspace();
    write_gray(dir.path(), "good_crop.png", &gradient(16, 8));
    write_corrupt(dir.path(), "bad_crop.png");
    write_gray(dir.path(), "fine_crop.png", &gradient(16, 8));

    let report = dither_dir(dir.path(), &config(16, 8, 2)).unwrap();
    assert_eq!(report.succeeded.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].0.ends_with("bad_crop.png"));
    assert!(!report.is_total_failure());
    assert!(dir.path().join("good_dithered.png").exists());
    assert!(dir.path().join("fine_dithered.png").exists());
}

#[test]
fn test_all_failures_is_total_failure() {
    let dir = workspace();
    write_corrupt(dir.path(), "x_crop.png");
    write_corrupt(dir.path(), "y_crop.png");

    let report = dither_dir(dir.path(), &config(16, 8, 2)).unwrap();
    assert_eq!(report.total(), 2);
    assert!(report.is_total_failure());
}

#[test]
fn test_empty_dir_is_not_a_failure() {
    let dir = workspace();
    let report = dither_dir(dir.path(), &config(16, 8, 2)).unwrap();
    assert_eq!(report.total(), 0);
    assert!(!report.is_total_failure());
}

#[test]
fn test_convert_dir_writes_bins_headers_and_index() {
    let dir = workspace();
    let out = dir.path().join("bin");
    let headers = dir.path().join("headers");
    write_gray(dir.path(), "alpha_dithered.png", &gradient(16, 4));
    write_gray(dir.path(), "beta_dithered.bmp", &gradient(16, 4));
    write_gray(dir.path(), "gamma_dithered.tiff", &gradient(16, 4));
    write_gray(dir.path(), "delta_crop.png", &gradient(16, 4));

    let target = HeaderTarget {
        dir: headers.clone(),
        invert: false,
    };
    let config = config(16, 4, 2);
    let batch = convert_dir(dir.path(), Some(&out), &config, Some(&target)).unwrap();
    assert_eq!(batch.index.unwrap(), Some(headers.join(INDEX_HEADER)));
    let report = batch.report;

    assert_eq!(report.total(), 2);
    for name in ["alpha.bin", "beta.bin"] {
        assert_eq!(std::fs::read(out.join(name)).unwrap().len(), 8);
    }
    assert!(headers.join("alpha.h").exists());
    assert!(headers.join("beta.h").exists());

    let index = std::fs::read_to_string(headers.join(INDEX_HEADER)).unwrap();
    assert!(index.contains("#define IMAGE_COUNT 2"));
    assert!(index.contains("#define IMAGE_SIZE 8"));
    assert!(index.contains("#include \"alpha.h\""));
    assert!(index.contains("#include \"beta.h\""));
    assert!(index.contains("{alpha_data, IMAGE_SIZE},"));
    assert!(!index.contains("gamma"));
}

#[test]
fn test_convert_dir_index_skips_failures() {
    let dir = workspace();
    let headers = dir.path().join("headers");
    write_gray(dir.path(), "ok_dithered.png", &gradient(8, 2));
    write_corrupt(dir.path(), "broken_dithered.png");

    let target = HeaderTarget {
        dir: headers.clone(),
        invert: true,
    };
    let report = convert_dir(dir.path(), None, &config(8, 2, 2), Some(&target))
        .unwrap()
        .report;
    assert_eq!(report.succeeded.len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert!(dir.path().join("ok.bin").exists());

    let index = std::fs::read_to_string(headers.join(INDEX_HEADER)).unwrap();
    assert!(index.contains("#define IMAGE_COUNT 1"));
    assert!(!index.contains("broken"));
}

#[test]
fn test_convert_dir_without_headers_writes_no_index() {
    let dir = workspace();
    write_gray(dir.path(), "plain_dithered.png", &gradient(8, 2));

    let batch = convert_dir(dir.path(), None, &config(8, 2, 4), None).unwrap();
    assert_eq!(batch.index.unwrap(), None);
    let report = batch.report;
    assert_eq!(report.succeeded.len(), 1);
    assert_eq!(report.succeeded[0].1.size, 4);
    assert!(!dir.path().join(INDEX_HEADER).exists());
}

#[test]
fn test_convert_dir_rejects_inputs_sharing_a_bin() {
    let dir = workspace();
    write_gray(dir.path(), "photo_dithered.png", &gradient(8, 2));
    write_gray(dir.path(), "photo_dithered.jpg", &gradient(8, 2));
    write_gray(dir.path(), "other_dithered.png", &gradient(8, 2));

    let report = convert_dir(dir.path(), None, &config(8, 2, 2), None)
        .unwrap()
        .report;
    assert_eq!(report.succeeded.len(), 1);
    assert!(report.succeeded[0].0.ends_with("other_dithered.png"));
    assert_eq!(report.failed.len(), 2);
    for (input, err) in &report.failed {
        assert_eq!(err.kind(), geink::error::ErrorKind::Validation, "{}", input.display());
        assert!(err.to_string().contains("photo.bin"));
    }
    assert!(!dir.path().join("photo.bin").exists());
}

#[test]
fn test_convert_dir_rejects_clashing_header_symbols() {
    let dir = workspace();
    let headers = dir.path().join("headers");
    write_gray(dir.path(), "图片_4_dithered.png", &gradient(8, 2));
    write_gray(dir.path(), "照片_4_dithered.png", &gradient(8, 2));
    write_gray(dir.path(), "a-b_dithered.png", &gradient(8, 2));
    write_gray(dir.path(), "a_b_dithered.png", &gradient(8, 2));

    let target = HeaderTarget {
        dir: headers.clone(),
        invert: false,
    };
    let batch = convert_dir(dir.path(), None, &config(8, 2, 2), Some(&target)).unwrap();
    let report = batch.report;

    let mut symbols: Vec<String> = report
        .succeeded
        .iter()
        .filter_map(|(_, outcome)| outcome.header.as_ref().map(|(_, s)| s.clone()))
        .collect();
    symbols.sort();
    assert_eq!(symbols, vec!["u56fe_u7247_4_data", "u7167_u7247_4_data"]);

    assert_eq!(report.failed.len(), 2);
    assert!(report
        .failed
        .iter()
        .all(|(_, err)| err.to_string().contains("A_B_DATA")));
    assert!(!headers.join("a-b.h").exists());
    assert!(!headers.join("a_b.h").exists());

    let index = std::fs::read_to_string(batch.index.unwrap().unwrap()).unwrap();
    assert!(index.contains("#define IMAGE_COUNT 2"));
    assert_eq!(index.matches("{u56fe_u7247_4_data, IMAGE_SIZE}").count(), 1);
    assert_eq!(index.matches("{u7167_u7247_4_data, IMAGE_SIZE}").count(), 1);
}

#[test]
fn test_convert_dir_keeps_report_when_index_fails() {
    let dir = workspace();
    let headers = dir.path().join("headers");
    // a directory where the index file should go
    std::fs::create_dir_all(headers.join(INDEX_HEADER)).unwrap();
    write_gray(dir.path(), "one_dithered.png", &gradient(8, 2));
    write_gray(dir.path(), "two_dithered.png", &gradient(8, 2));

    let target = HeaderTarget {
        dir: headers.clone(),
        invert: false,
    };
    let batch = convert_dir(dir.path(), None, &config(8, 2, 2), Some(&target)).unwrap();
    assert_eq!(batch.report.succeeded.len(), 2);
    assert!(batch.report.failed.is_empty());
    assert!(headers.join("one.h").exists());

    let err = batch.index.unwrap_err();
    assert_eq!(err.kind(), geink::error::ErrorKind::Io);
}
