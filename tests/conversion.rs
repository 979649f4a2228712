//! Integration tests for edgequake-img2pdf.
//!
//! Fixture images are generated with the `image` crate inside temporary
//! directories; the PDFs produced are opened again with `lopdf` to check
//! page count, page size, and the embedded image.
//!
//! Run with:
//!   cargo test --test conversion -- --nocapture

use edgequake_img2pdf::{
    ConversionConfig, ConversionMode, ConversionWorker, Converter, ErrorKind, Img2PdfError,
    ItemError, PageSize, Session, WorkerEvent,
};
use image::{Rgb, RgbImage};
use lopdf::content::Content;
use lopdf::{Document, Object};
use std::path::{Path, PathBuf};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("edgequake_img2pdf=debug")
        .with_test_writer()
        .try_init();
}

fn write_image(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_fn(w, h, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]))
        .save_with_format(&path, image::ImageFormat::Png)
        .unwrap();
    path
}

fn load_pdf(path: &Path) -> Document {
    Document::load(path).unwrap_or_else(|e| panic!("{} is not a readable PDF: {e}", path.display()))
}

fn number(obj: &Object) -> f32 {
    match obj {
        Object::Integer(i) => *i as f32,
        Object::Real(r) => *r as f32,
        other => panic!("expected a number, got {other:?}"),
    }
}

/// (width, height) of every page's MediaBox, in page order.
fn media_boxes(doc: &Document) -> Vec<(f32, f32)> {
    doc.get_pages()
        .values()
        .map(|&id| {
            let page = doc.get_object(id).unwrap().as_dict().unwrap();
            let mbox = page.get(b"MediaBox").unwrap().as_array().unwrap();
            (
                number(&mbox[2]) - number(&mbox[0]),
                number(&mbox[3]) - number(&mbox[1]),
            )
        })
        .collect()
}

/// (width, height) in pixels of every image XObject in the file.
fn embedded_images(doc: &Document) -> Vec<(i64, i64)> {
    doc.objects
        .values()
        .filter_map(|obj| match obj {
            Object::Stream(s) => {
                let is_image =
                    matches!(s.dict.get(b"Subtype"), Ok(Object::Name(n)) if n == b"Image");
                if !is_image {
                    return None;
                }
                let w = s.dict.get(b"Width").ok()?.as_i64().ok()?;
                let h = s.dict.get(b"Height").ok()?.as_i64().ok()?;
                Some((w, h))
            }
            _ => None,
        })
        .collect()
}

/// Operands of the `cm` operator that positions the image drawn on
/// `page_number` (1-indexed): `[a, b, c, d, e, f]`.
fn image_transform(doc: &Document, page_number: u32) -> Vec<f32> {
    let page_id = doc.get_pages()[&page_number];
    let bytes = doc.get_page_content(page_id).unwrap();
    let content = Content::decode(&bytes).unwrap();

    let ops = &content.operations;
    let do_at = ops
        .iter()
        .position(|op| op.operator == "Do")
        .unwrap_or_else(|| panic!("page {page_number} draws no XObject"));
    let cm = ops[..do_at]
        .iter()
        .rev()
        .find(|op| op.operator == "cm")
        .unwrap_or_else(|| panic!("page {page_number} has no transform before Do"));
    cm.operands.iter().map(number).collect()
}

fn assert_transform(actual: &[f32], expected: [f32; 6]) {
    assert_eq!(actual.len(), 6, "cm operands: {actual:?}");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() < 0.5,
            "cm operand {i}: expected {e}, got {a} (all: {actual:?})"
        );
    }
}

fn assert_close(actual: f32, expected: f32, what: &str) {
    assert!(
        (actual - expected).abs() < 0.5,
        "{what}: expected {expected}, got {actual}"
    );
}

// ── Single image ─────────────────────────────────────────────────────────────

#[test]
fn single_image_becomes_one_a4_page_at_native_resolution() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let img = write_image(dir.path(), "portrait.png", 100, 200);

    let out = Converter::default().convert_image(&img, None).unwrap();
    assert_eq!(out, dir.path().join("portrait.pdf"));

    let doc = load_pdf(&out);
    let boxes = media_boxes(&doc);
    assert_eq!(boxes.len(), 1);
    assert_close(boxes[0].0, 595.0, "A4 width");
    assert_close(boxes[0].1, 842.0, "A4 height");
    assert_eq!(embedded_images(&doc), vec![(100, 200)]);
}

#[test]
fn tall_image_fills_drawable_height() {
    let dir = tempfile::tempdir().unwrap();
    let img = write_image(dir.path(), "tall.png", 1000, 2000);
    let converter = Converter::default();

    let placement = converter.layout_for(&img).unwrap();
    assert_close(placement.height, 842.0 - 100.0, "drawn height");
    assert_close(placement.width, 371.0, "drawn width");
    assert_close(placement.x + placement.width / 2.0, 595.0 / 2.0, "centre x");

    let out = converter
        .convert_image(&img, Some(&dir.path().join("tall.pdf")))
        .unwrap();
    let doc = load_pdf(&out);
    assert_eq!(embedded_images(&doc), vec![(1000, 2000)]);

    // Drawn 371 × 742 pt with its lower-left corner at (112, 50).
    assert_transform(
        &image_transform(&doc, 1),
        [371.0, 0.0, 0.0, 742.0, 112.0, 50.0],
    );
}

#[test]
fn reconverting_to_same_output_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let img = write_image(dir.path(), "again.png", 40, 30);
    let out = dir.path().join("again-out.pdf");
    let converter = Converter::default();

    converter.convert_image(&img, Some(&out)).unwrap();
    let first = std::fs::metadata(&out).unwrap().len();
    converter.convert_image(&img, Some(&out)).unwrap();

    assert_eq!(std::fs::metadata(&out).unwrap().len(), first);
    assert_eq!(media_boxes(&load_pdf(&out)).len(), 1);
}

#[test]
fn letter_pages_use_letter_media_box() {
    let dir = tempfile::tempdir().unwrap();
    let img = write_image(dir.path(), "wide.png", 300, 100);
    let config = ConversionConfig::builder()
        .page_size(PageSize::Letter)
        .margin(0.0)
        .build()
        .unwrap();

    let out = Converter::new(config)
        .unwrap()
        .convert_image(&img, None)
        .unwrap();
    let doc = load_pdf(&out);
    let boxes = media_boxes(&doc);
    assert_close(boxes[0].0, 612.0, "Letter width");
    assert_close(boxes[0].1, 792.0, "Letter height");

    // Width-constrained: 612 × 204 pt, centred vertically.
    assert_transform(
        &image_transform(&doc, 1),
        [612.0, 0.0, 0.0, 204.0, 0.0, 294.0],
    );
}

#[test]
fn single_image_errors_are_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let converter = Converter::default();

    let err = converter
        .convert_image(&dir.path().join("nope.png"), None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let doc = dir.path().join("report.docx");
    std::fs::write(&doc, b"not an image").unwrap();
    let err = converter.convert_image(&doc, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    assert!(!dir.path().join("report.pdf").exists());
}

#[test]
fn oversized_margin_is_invalid_configuration() {
    let err = ConversionConfig::builder()
        .page_size(PageSize::A4)
        .margin(300.0)
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
}

// ── Merge ────────────────────────────────────────────────────────────────────

#[test]
fn merge_keeps_valid_images_and_reports_invalid_ones() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let a = write_image(dir.path(), "a.png", 10, 20);
    let b = write_image(dir.path(), "b.png", 30, 10);
    let c = write_image(dir.path(), "c.png", 15, 15);
    let missing = dir.path().join("missing.jpg");
    let text = dir.path().join("notes.txt");
    std::fs::write(&text, b"x").unwrap();

    let out_path = dir.path().join("merged.pdf");
    let out = Converter::default()
        .merge_images(&[a.clone(), missing, b.clone(), text, c.clone()], &out_path)
        .unwrap();

    assert_eq!(out.page_count(), 3);
    assert_eq!(out.pages, vec![a, b, c]);
    assert_eq!(out.skipped.len(), 2);
    assert_eq!(out.skipped[0].reason, ItemError::NotFound);
    assert_eq!(out.skipped[1].reason.kind(), ErrorKind::UnsupportedFormat);

    let doc = load_pdf(&out_path);
    assert_eq!(doc.get_pages().len(), 3);
    let mut sizes = embedded_images(&doc);
    sizes.sort();
    assert_eq!(sizes, vec![(10, 20), (15, 15), (30, 10)]);
}

#[test]
fn merge_of_only_invalid_inputs_fails_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let text = dir.path().join("a.txt");
    std::fs::write(&text, b"x").unwrap();
    let out = dir.path().join("never.pdf");

    let err = Converter::default()
        .merge_images(&[dir.path().join("gone.png"), text], &out)
        .unwrap_err();
    assert!(matches!(err, Img2PdfError::NoValidImages { skipped: 2 }));
    assert!(!out.exists());
}

#[test]
fn merge_directory_orders_pages_by_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let second = write_image(dir.path(), "02.png", 20, 10);
    let first = write_image(dir.path(), "01.png", 10, 10);
    let out_path = dir.path().join("all.pdf");

    let out = Converter::default()
        .merge_directory(dir.path(), &out_path)
        .unwrap();
    assert_eq!(out.pages, vec![first, second]);
    assert_eq!(load_pdf(&out_path).get_pages().len(), 2);
}

// ── Directory batch ──────────────────────────────────────────────────────────

#[test]
fn directory_batch_converts_only_supported_files() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_image(dir.path(), "one.png", 8, 8);
    write_image(dir.path(), "two.PNG", 8, 8);
    let jpg = dir.path().join("three.JPG");
    RgbImage::from_pixel(8, 8, Rgb([5, 5, 5]))
        .save_with_format(&jpg, image::ImageFormat::Jpeg)
        .unwrap();
    std::fs::write(dir.path().join("readme.md"), b"# hi").unwrap();
    std::fs::write(dir.path().join("data.csv"), b"a,b").unwrap();

    let out_dir = dir.path().join("pdfs");
    let out = Converter::default()
        .convert_directory(dir.path(), Some(&out_dir))
        .unwrap();

    assert_eq!(out.created.len(), 3);
    assert!(out.is_complete_success());
    for name in ["one.pdf", "two.pdf", "three.pdf"] {
        let pdf = out_dir.join(name);
        assert!(pdf.exists(), "{} missing", pdf.display());
        assert_eq!(load_pdf(&pdf).get_pages().len(), 1);
    }
}

#[test]
fn directory_batch_defaults_to_input_directory() {
    let dir = tempfile::tempdir().unwrap();
    write_image(dir.path(), "here.png", 4, 4);

    let out = Converter::default()
        .convert_directory(dir.path(), None)
        .unwrap();
    assert_eq!(out.created, vec![dir.path().join("here.pdf")]);
}

#[test]
fn one_unwritable_output_does_not_abort_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    write_image(dir.path(), "a.png", 6, 6);
    write_image(dir.path(), "b.png", 6, 6);
    write_image(dir.path(), "c.png", 6, 6);

    // A directory squatting on b.pdf makes that one write fail.
    let out_dir = dir.path().join("out");
    std::fs::create_dir_all(out_dir.join("b.pdf")).unwrap();

    let out = Converter::default()
        .convert_directory(dir.path(), Some(&out_dir))
        .unwrap();

    assert_eq!(out.created, vec![out_dir.join("a.pdf"), out_dir.join("c.pdf")]);
    assert_eq!(out.failed.len(), 1);
    assert_eq!(out.failed[0].path, dir.path().join("b.png"));
    assert_eq!(out.failed[0].error.kind(), ErrorKind::IoFailure);
}

#[test]
fn directory_errors() {
    let dir = tempfile::tempdir().unwrap();
    let converter = Converter::default();

    let err = converter
        .convert_directory(&dir.path().join("absent"), None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let file = write_image(dir.path(), "file.png", 2, 2);
    let err = converter.convert_directory(&file, None).unwrap_err();
    assert!(matches!(err, Img2PdfError::NotADirectory { .. }));

    let empty = dir.path().join("empty");
    std::fs::create_dir(&empty).unwrap();
    let err = converter.convert_directory(&empty, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoValidImages);
}

// ── Session + worker ─────────────────────────────────────────────────────────

#[test]
fn session_runs_single_pdf_mode_through_worker() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_image(dir.path(), "p1.png", 12, 12);
    write_image(dir.path(), "p2.png", 12, 24);

    let mut session = Session::new();
    session.add_directory(dir.path()).unwrap();
    session.mode = ConversionMode::Single;
    session.output = Some(dir.path().join("book.pdf"));
    session.margin_text = "20".into();

    let worker = ConversionWorker::new();
    let mut handle = session.start(&worker).unwrap();
    assert!(session.is_converting());

    while let Some(event) = handle.blocking_recv() {
        let terminal = event.is_terminal();
        if let WorkerEvent::Failed(ref e) = event {
            panic!("conversion failed: {e}");
        }
        session.apply_event(&event);
        if terminal {
            break;
        }
    }
    handle.join();

    assert!(!session.is_converting());
    assert!(!worker.is_busy());
    assert_eq!(
        session.status(),
        format!("Created: {}", dir.path().join("book.pdf").display())
    );
    assert_eq!(load_pdf(&dir.path().join("book.pdf")).get_pages().len(), 2);
}
