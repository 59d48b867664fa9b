//! End-to-end export: logo, charts, layout, rendering and the final write.

use std::fmt::Display;
use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::{DateTime, TimeZone};
use log::{error, info};

use crate::aggregate::group_by_category;
use crate::builder::{DocumentBuilder, RenderError, RenderedPdf};
use crate::charts::raster::{ChartImages, ChartRasterizer};
use crate::charts::svg::ChartCanvas;
use crate::charts::ChartData;
use crate::config::{ReportConfig, Slot};
use crate::document::{ImageSource, ReportDocument};
use crate::elements::decode_image_from_bytes;
use crate::fonts;
use crate::format::ReportTimestamps;
use crate::layout::{ReportContent, ReportLayout};
use crate::product::ProductRecord;
use crate::table::AverageGlyphWidth;

const CHART_PX_PER_MM: f64 = 4.0;

/// Reasons an export produces no file.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("logo image {} could not be read", path.display())]
    LogoRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("logo image {} could not be decoded", path.display())]
    LogoDecode {
        path: PathBuf,
        #[source]
        source: genpdf::error::Error,
    },
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("report could not be written to {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Outcome of a successful export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub bytes: usize,
    pub pages: usize,
}

/// Builds the report from the current catalog and saves it.
pub struct ReportAssembler {
    config: ReportConfig,
    measure: AverageGlyphWidth,
}

impl ReportAssembler {
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config,
            measure: AverageGlyphWidth::default(),
        }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Reads the logo and checks that it decodes.
    pub fn load_logo(&self) -> Result<ImageSource, ExportError> {
        let path = &self.config.logo_path;
        let bytes = fs::read(path).map_err(|source| ExportError::LogoRead {
            path: path.clone(),
            source,
        })?;
        decode_image_from_bytes(&bytes).map_err(|source| ExportError::LogoDecode {
            path: path.clone(),
            source,
        })?;
        Ok(ImageSource::from_bytes(bytes))
    }

    /// Rasterizes the price and category charts for `products`.
    ///
    /// Returns no images when charts are disabled; individual chart failures are logged and
    /// leave that chart out.
    pub fn rasterize_charts(&self, products: &[ProductRecord]) -> ChartImages {
        if !self.config.render_charts {
            return ChartImages::none();
        }
        let data = ChartData::build(products, &group_by_category(products));
        let layout = &self.config.layout;
        ChartRasterizer::new(&fonts::font_search_directories())
            .with_canvases(
                canvas_for(layout.price_chart),
                canvas_for(layout.category_chart),
            )
            .render_all(&data)
    }

    /// Lays out the report for `products` as of `now`.
    pub fn assemble<Tz>(
        &self,
        products: &[ProductRecord],
        logo: &ImageSource,
        charts: &ChartImages,
        now: &DateTime<Tz>,
    ) -> ReportDocument
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let timestamps = ReportTimestamps::at(now);
        let content = ReportContent {
            products,
            logo,
            charts,
            timestamps: &timestamps,
        };
        ReportLayout::new(&self.config.layout, &self.measure).layout(&content)
    }

    pub fn render(&self, document: ReportDocument) -> Result<RenderedPdf, ExportError> {
        Ok(DocumentBuilder::for_layout(&self.config.layout).render(document)?)
    }

    /// Runs the whole export and writes the file.
    ///
    /// Nothing is written unless every earlier step succeeded.
    pub fn export<Tz>(
        &self,
        products: &[ProductRecord],
        now: &DateTime<Tz>,
    ) -> Result<ExportSummary, ExportError>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let result = self.try_export(products, now);
        if let Err(err) = &result {
            error!("Report export failed: {}", err);
        }
        result
    }

    fn try_export<Tz>(
        &self,
        products: &[ProductRecord],
        now: &DateTime<Tz>,
    ) -> Result<ExportSummary, ExportError>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        info!("Exporting report of {} products", products.len());
        let logo = self.load_logo()?;
        let charts = self.rasterize_charts(products);
        let document = self.assemble(products, &logo, &charts, now);
        let pdf = self.render(document)?;

        let path = self.config.output_path();
        let write_error = |source| ExportError::Write {
            path: path.clone(),
            source,
        };
        fs::create_dir_all(&self.config.output_dir).map_err(write_error)?;
        fs::write(&path, &pdf.bytes).map_err(write_error)?;

        info!(
            "Saved {} ({} pages, {} bytes)",
            path.display(),
            pdf.page_count,
            pdf.len()
        );
        Ok(ExportSummary {
            bytes: pdf.len(),
            pages: pdf.page_count,
            path,
        })
    }
}

/// Chart canvas with the aspect ratio of `slot`, at four pixels per millimetre (about 100 DPI).
fn canvas_for(slot: Slot) -> ChartCanvas {
    ChartCanvas {
        width: slot.width * CHART_PX_PER_MM,
        height: slot.height * CHART_PX_PER_MM,
    }
}
