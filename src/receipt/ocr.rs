// Copyright 2023 Remi Bernotavicius

use derive_more::{Display, Error, From};
use image::{DynamicImage, GrayImage, Luma};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Grayscale values above this become white, the rest black.
const THRESHOLD: u8 = 150;

#[derive(Debug, Display, Error, From)]
pub enum OcrError {
    #[display("receipt image error: {_0}")]
    #[from]
    Image(image::ImageError),
    #[display("couldn't run {program:?}, is tesseract installed?")]
    TesseractMissing {
        program: PathBuf,
        #[error(source)]
        error: std::io::Error,
    },
    #[display("tesseract failed ({status}): {stderr}")]
    TesseractFailed { status: String, stderr: String },
    #[display("couldn't create scratch image: {_0}")]
    Scratch(std::io::Error),
}

/// Black and white copy of `image`, which tesseract reads more reliably.
pub fn threshold(image: &DynamicImage) -> GrayImage {
    let mut gray = image.to_luma8();
    for Luma([value]) in gray.pixels_mut() {
        *value = if *value > THRESHOLD { u8::MAX } else { 0 };
    }
    gray
}

fn run_tesseract(tesseract: &Path, image_path: &Path) -> Result<String, OcrError> {
    log::debug!("running {} on {}", tesseract.display(), image_path.display());
    let output = Command::new(tesseract)
        .arg(image_path)
        .args(["stdout", "--oem", "3", "--psm", "6"])
        .output()
        .map_err(|error| OcrError::TesseractMissing {
            program: tesseract.to_owned(),
            error,
        })?;

    if !output.status.success() {
        return Err(OcrError::TesseractFailed {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Reads the text on a receipt photo using the `tesseract` executable.
pub fn perform_ocr(image_path: &Path, tesseract: &Path) -> Result<String, OcrError> {
    perform_ocr_in(image_path, tesseract, &std::env::temp_dir())
}

/// The black and white copy handed to tesseract lives in `scratch_dir` and is removed on return.
fn perform_ocr_in(
    image_path: &Path,
    tesseract: &Path,
    scratch_dir: &Path,
) -> Result<String, OcrError> {
    log::info!("scanning receipt {}", image_path.display());
    let prepared = threshold(&image::open(image_path)?);

    let scratch = tempfile::Builder::new()
        .prefix("cuisinecraft-ocr-")
        .suffix(".png")
        .tempfile_in(scratch_dir)
        .map_err(OcrError::Scratch)?;
    prepared.save_with_format(scratch.path(), image::ImageFormat::Png)?;

    let text = run_tesseract(tesseract, scratch.path())?;
    log::info!("tesseract read {} lines", text.lines().count());
    Ok(text)
}

#[test]
fn threshold_is_binary() {
    let mut gray = GrayImage::new(3, 1);
    gray.put_pixel(0, 0, Luma([10]));
    gray.put_pixel(1, 0, Luma([150]));
    gray.put_pixel(2, 0, Luma([151]));

    let out = threshold(&DynamicImage::ImageLuma8(gray));
    let values: Vec<u8> = out.pixels().map(|p| p.0[0]).collect();
    assert_eq!(values, [0, 0, 255]);
}

#[test]
fn missing_image_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let error = perform_ocr(&dir.path().join("nope.png"), Path::new("tesseract")).unwrap_err();
    assert!(matches!(error, OcrError::Image(_)));
}

#[test]
fn missing_tesseract_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("receipt.png");
    GrayImage::new(4, 4).save(&image_path).unwrap();

    let error = perform_ocr(&image_path, &dir.path().join("no-such-tesseract")).unwrap_err();
    assert!(matches!(error, OcrError::TesseractMissing { .. }));
}

#[test]
fn scratch_image_removed_after_failure() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("receipt.png");
    GrayImage::new(4, 4).save(&image_path).unwrap();
    let scratch_dir = tempfile::tempdir().unwrap();

    let error = perform_ocr_in(
        &image_path,
        &dir.path().join("no-such-tesseract"),
        scratch_dir.path(),
    )
    .unwrap_err();
    assert!(matches!(error, OcrError::TesseractMissing { .. }));
    assert_eq!(std::fs::read_dir(scratch_dir.path()).unwrap().count(), 0);
}

#[test]
fn missing_scratch_dir_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("receipt.png");
    GrayImage::new(4, 4).save(&image_path).unwrap();

    let error = perform_ocr_in(
        &image_path,
        Path::new("tesseract"),
        &dir.path().join("missing"),
    )
    .unwrap_err();
    assert!(matches!(error, OcrError::Scratch(_)));
}
