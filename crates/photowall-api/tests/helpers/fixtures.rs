//! Test fixtures: small images and documents plus multipart forms.

use axum_test::multipart::{MultipartForm, Part};
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }));
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, format)
        .expect("Failed to encode fixture image");
    buffer.into_inner()
}

/// Small valid JPEG.
pub fn create_test_jpeg() -> Vec<u8> {
    encode(32, 24, ImageFormat::Jpeg)
}

/// Valid PNG of given dimensions.
pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Png)
}

/// Minimal PDF header, enough to be rejected by content type.
pub fn create_test_pdf() -> Vec<u8> {
    b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\ntrailer\n<< /Root 1 0 R >>\n%%EOF\n"
        .to_vec()
}

pub fn upload_form(
    batch_id: Option<&str>,
    file_id: Option<&str>,
    file: Option<(Vec<u8>, &str, &str)>,
) -> MultipartForm {
    let mut form = MultipartForm::new();
    if let Some(batch_id) = batch_id {
        form = form.add_text("batchId", batch_id.to_string());
    }
    if let Some(file_id) = file_id {
        form = form.add_text("fileId", file_id.to_string());
    }
    if let Some((data, filename, mime)) = file {
        form = form.add_part(
            "file",
            Part::bytes(data)
                .file_name(filename.to_string())
                .mime_type(mime.to_string()),
        );
    }
    form
}

pub fn jpeg_form(batch_id: &str, file_id: Option<&str>, filename: &str) -> MultipartForm {
    upload_form(
        Some(batch_id),
        file_id,
        Some((create_test_jpeg(), filename, "image/jpeg")),
    )
}
