//! Rasterization of chart markup into PNG bitmaps.

use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, warn};
use resvg::{tiny_skia, usvg};

use super::svg::{bar_chart, pie_chart, ChartCanvas};
use super::ChartData;
use crate::document::ImageSource;

/// Pixel density multiplier applied on top of the chart canvas size.
pub const DEFAULT_SCALE: f32 = 1.0;

/// Errors raised while turning chart markup into a bitmap.
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("chart markup could not be parsed: {0}")]
    Parse(#[from] usvg::Error),
    #[error("chart surface of {width}x{height} px could not be allocated")]
    Surface { width: u32, height: u32 },
    #[error("chart bitmap could not be encoded: {0}")]
    Encode(String),
}

/// Rasterized charts ready to be embedded into the report.
///
/// Either chart may be missing; the report then leaves its slot empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChartImages {
    pub price: Option<ImageSource>,
    pub category: Option<ImageSource>,
}

impl ChartImages {
    /// No chart bitmaps at all.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.price.is_none() && self.category.is_none()
    }
}

/// Renders SVG charts into PNG bytes.
pub struct ChartRasterizer {
    options: usvg::Options<'static>,
    price_canvas: ChartCanvas,
    category_canvas: ChartCanvas,
    scale: f32,
}

impl ChartRasterizer {
    /// Creates a rasterizer that resolves chart text against the system fonts and `font_dirs`.
    pub fn new(font_dirs: &[PathBuf]) -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        fontdb.load_system_fonts();
        for dir in font_dirs {
            fontdb.load_fonts_dir(dir);
        }
        debug!("chart font database holds {} faces", fontdb.len());

        let mut options = usvg::Options::default();
        options.fontdb = Arc::new(fontdb);

        Self {
            options,
            price_canvas: ChartCanvas::default(),
            category_canvas: ChartCanvas::default(),
            scale: DEFAULT_SCALE,
        }
    }

    /// Sets the logical size of each chart and returns the updated rasterizer.
    pub fn with_canvases(mut self, price: ChartCanvas, category: ChartCanvas) -> Self {
        self.price_canvas = price;
        self.category_canvas = category;
        self
    }

    /// Sets the pixel density multiplier and returns the updated rasterizer.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Rasterizes SVG markup into PNG bytes.
    pub fn rasterize(&self, markup: &str) -> Result<Vec<u8>, ChartError> {
        let tree = usvg::Tree::from_str(markup, &self.options)?;
        let size = tree.size();
        let width = (size.width() * self.scale).ceil() as u32;
        let height = (size.height() * self.scale).ceil() as u32;

        let mut pixmap =
            tiny_skia::Pixmap::new(width, height).ok_or(ChartError::Surface { width, height })?;
        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(self.scale, self.scale),
            &mut pixmap.as_mut(),
        );

        pixmap
            .encode_png()
            .map_err(|err| ChartError::Encode(err.to_string()))
    }

    /// Rasterizes the price bar chart.
    pub fn price_chart(&self, data: &ChartData) -> Result<Vec<u8>, ChartError> {
        self.rasterize(&bar_chart(&data.price, self.price_canvas))
    }

    /// Rasterizes the category pie chart.
    pub fn category_chart(&self, data: &ChartData) -> Result<Vec<u8>, ChartError> {
        self.rasterize(&pie_chart(&data.category, self.category_canvas))
    }

    /// Rasterizes both charts in order, bar chart first.
    ///
    /// A chart that fails to rasterize is logged and left out.
    pub fn render_all(&self, data: &ChartData) -> ChartImages {
        let price = match self.price_chart(data) {
            Ok(bytes) => Some(ImageSource::from_bytes(bytes)),
            Err(err) => {
                warn!("Skipping price chart: {}", err);
                None
            }
        };
        let category = match self.category_chart(data) {
            Ok(bytes) => Some(ImageSource::from_bytes(bytes)),
            Err(err) => {
                warn!("Skipping category chart: {}", err);
                None
            }
        };
        ChartImages { price, category }
    }
}
