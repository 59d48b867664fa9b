//! Export settings and the layout constants of the report.

use std::path::PathBuf;

use genpdf::style::Color;

use crate::document::Point;
use crate::source::DEFAULT_ENDPOINT;

/// File name the report is saved under.
pub const REPORT_FILE_NAME: &str = "full-report.pdf";

/// Logo read when no other path is configured.
pub const DEFAULT_LOGO_PATH: &str = "public/golden2.png";

/// Where the catalog comes from and where the report goes.
#[derive(Clone, Debug)]
pub struct ReportConfig {
    pub endpoint: String,
    pub logo_path: PathBuf,
    pub output_dir: PathBuf,
    pub file_name: String,
    /// Rasterize the charts; when disabled the chart page is left empty.
    pub render_charts: bool,
    pub layout: LayoutConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            logo_path: PathBuf::from(DEFAULT_LOGO_PATH),
            output_dir: PathBuf::from("."),
            file_name: REPORT_FILE_NAME.to_string(),
            render_charts: true,
            layout: LayoutConfig::default(),
        }
    }
}

impl ReportConfig {
    /// Full path of the saved report.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.file_name)
    }
}

/// A rectangle on the page reserved for an image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Slot {
    pub origin: Point,
    pub width: f64,
    pub height: f64,
}

impl Slot {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point { x, y },
            width,
            height,
        }
    }
}

/// Colours used across the report.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Border and rules.
    pub accent: Color,
    /// Report title in the header band.
    pub title: Color,
    /// Heading and metadata text.
    pub heading: Color,
    pub body: Color,
    pub watermark: Color,
    pub table_header_fill: Color,
    pub table_header_text: Color,
    pub table_grid: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            accent: Color::Rgb(0x4c, 0x9d, 0xba),
            title: Color::Rgb(0x54, 0x9d, 0x9e),
            heading: Color::Rgb(128, 0, 128),
            body: Color::Rgb(0, 0, 0),
            watermark: Color::Rgb(150, 150, 150),
            table_header_fill: Color::Rgb(0x71, 0x40, 0x7a),
            table_header_text: Color::Rgb(255, 255, 255),
            table_grid: Color::Rgb(0, 0, 0),
        }
    }
}

/// Fixed geometry, texts and font sizes of the report.
///
/// All lengths are millimetres; font sizes are points.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
    pub page_width: f64,
    pub page_height: f64,
    pub margin: f64,
    /// Distance of the decorative border from the page edge.
    pub border_inset: f64,
    pub palette: Palette,

    pub logo: Slot,
    pub title: String,
    pub title_font_size: u8,
    /// Top edge of the report title text.
    pub title_top: f64,

    pub heading: String,
    pub heading_font_size: u8,
    pub heading_top: f64,
    /// Description markup, see [`crate::richtext::parse_markup`].
    pub description: String,
    pub description_font_size: u8,
    pub description_top: f64,
    pub timestamp_font_size: u8,
    pub timestamp_top: f64,
    /// Rule closing the metadata block on the first page.
    pub metadata_rule_y: f64,

    pub table_font_size: u8,
    pub table_cell_padding: f64,
    /// Gap between the rule above the table and the table itself.
    pub table_gap: f64,
    /// Rows never extend below this line.
    pub table_bottom_limit: f64,

    pub price_chart: Slot,
    pub category_chart: Slot,

    pub watermark: String,
    pub watermark_font_size: u8,
    pub page_number_font_size: u8,
    /// Rule below the lowest content, relative to it.
    pub footer_rule_offset: f64,
    /// Footer text top edge, relative to the lowest content.
    pub footer_text_offset: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: 297.0,
            page_height: 210.0,
            margin: 10.0,
            border_inset: 5.0,
            palette: Palette::default(),

            logo: Slot::new(10.0, 5.0, 33.0, 22.0),
            title: "Elogix Report".to_string(),
            title_font_size: 20,
            title_top: 12.5,

            heading: "Final Report".to_string(),
            heading_font_size: 25,
            heading_top: 30.0,
            description:
                "[color=#800080]{**Report Description:**}  Lorem ipsum dolor sit amet.Ut enim ad minim veniam."
                    .to_string(),
            description_font_size: 9,
            description_top: 42.0,
            timestamp_font_size: 8,
            timestamp_top: 31.0,
            metadata_rule_y: 48.0,

            table_font_size: 9,
            table_cell_padding: 1.5,
            table_gap: 6.0,
            table_bottom_limit: 185.0,

            price_chart: Slot::new(10.0, 62.0, 140.0, 100.0),
            category_chart: Slot::new(169.0, 40.0, 140.0, 95.0),

            watermark: "Powered by Elogix".to_string(),
            watermark_font_size: 9,
            page_number_font_size: 10,
            footer_rule_offset: 10.0,
            footer_text_offset: 13.0,
        }
    }
}

impl LayoutConfig {
    /// Y coordinate of the rule closing the header band.
    pub fn header_rule_y(&self) -> f64 {
        self.logo.origin.y + self.logo.height + 1.0
    }

    /// Right edge of the printable content.
    pub fn content_right(&self) -> f64 {
        self.page_width - self.margin
    }

    pub fn content_width(&self) -> f64 {
        self.page_width - 2.0 * self.margin
    }

    /// Inner bottom edge of the decorative border.
    pub fn border_bottom(&self) -> f64 {
        self.page_height - self.border_inset
    }
}
