use std::fs;
use std::path::Path;

use chrono::{FixedOffset, TimeZone};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use product_report::config::ReportConfig;
use product_report::export::{ExportError, ReportAssembler};
use product_report::fonts;
use product_report::product::ProductRecord;
use product_report::source::{CatalogStore, FetchError, ProductSource};

struct FixtureSource(Vec<ProductRecord>);

impl ProductSource for FixtureSource {
    fn describe(&self) -> String {
        "fixture".to_string()
    }

    fn fetch(&self) -> Result<Vec<ProductRecord>, FetchError> {
        Ok(self.0.clone())
    }
}

fn catalog() -> Vec<ProductRecord> {
    vec![
        ProductRecord::new(1, "Essence Mascara Lash Princess", "beauty", 9.99)
            .with_brand("Essence")
            .with_rating(4.94),
        ProductRecord::new(2, "Eyeshadow Palette with Mirror", "beauty", 19.99)
            .with_brand("Glamour Beauty")
            .with_rating(3.28),
        ProductRecord::new(6, "Calvin Klein CK One", "fragrances", 49.99)
            .with_brand("Calvin Klein")
            .with_rating(4.85),
        ProductRecord::new(16, "Apple", "groceries", 1.99).with_rating(2.96),
    ]
}

/// Writes a logo with transparent corners, as the real asset has.
fn write_logo(path: &Path) {
    let mut logo = RgbaImage::from_pixel(66, 44, Rgba([0xd4, 0xaf, 0x37, 255]));
    logo.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
    DynamicImage::ImageRgba8(logo)
        .save_with_format(path, ImageFormat::Png)
        .expect("write logo");
}

fn config_in(dir: &Path, render_charts: bool) -> ReportConfig {
    ReportConfig {
        logo_path: dir.join("golden2.png"),
        output_dir: dir.join("reports"),
        render_charts,
        ..ReportConfig::default()
    }
}

fn export_instant() -> chrono::DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .expect("valid offset")
        .with_ymd_and_hms(2024, 6, 1, 9, 30, 0)
        .single()
        .expect("valid instant")
}

#[test]
fn exports_fetched_catalog_to_fixed_file_name() {
    if !fonts::default_fonts_available() {
        eprintln!("Skipping exports_fetched_catalog_to_fixed_file_name: no font family found.");
        return;
    }

    let dir = tempfile::tempdir().expect("temp dir");
    write_logo(&dir.path().join("golden2.png"));

    let mut store = CatalogStore::new();
    assert!(store.refresh(&FixtureSource(catalog())));

    let assembler = ReportAssembler::new(config_in(dir.path(), true));
    let summary = assembler
        .export(store.products(), &export_instant())
        .expect("export succeeds");

    assert_eq!(summary.path, dir.path().join("reports").join("full-report.pdf"));
    assert_eq!(summary.pages, 2);
    let written = fs::read(&summary.path).expect("report written");
    assert_eq!(written.len(), summary.bytes);
    assert!(written.starts_with(b"%PDF"));
}

#[test]
fn empty_catalog_still_exports_table_and_chart_pages() {
    if !fonts::default_fonts_available() {
        eprintln!(
            "Skipping empty_catalog_still_exports_table_and_chart_pages: no font family found."
        );
        return;
    }

    let dir = tempfile::tempdir().expect("temp dir");
    write_logo(&dir.path().join("golden2.png"));

    let assembler = ReportAssembler::new(config_in(dir.path(), false));
    let summary = assembler
        .export(&[], &export_instant())
        .expect("export succeeds");
    assert_eq!(summary.pages, 2);
    assert!(summary.path.is_file());
}

#[test]
fn missing_logo_fails_and_writes_nothing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let assembler = ReportAssembler::new(config_in(dir.path(), false));

    let err = assembler
        .export(&catalog(), &export_instant())
        .expect_err("export must fail without a logo");
    assert!(matches!(err, ExportError::LogoRead { .. }));
    assert!(!dir.path().join("reports").exists());
}

#[test]
fn assembled_layout_matches_for_identical_inputs() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_logo(&dir.path().join("golden2.png"));
    let assembler = ReportAssembler::new(config_in(dir.path(), false));

    let logo = assembler.load_logo().expect("logo loads");
    let charts = assembler.rasterize_charts(&catalog());
    let first = assembler.assemble(&catalog(), &logo, &charts, &export_instant());
    let second = assembler.assemble(&catalog(), &logo, &charts, &export_instant());
    assert_eq!(first, second);
}
