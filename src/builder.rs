//! Turns a laid-out [`ReportDocument`] into PDF bytes.

use genpdf::error::Error;
use genpdf::Size;
use log::debug;

use crate::config::LayoutConfig;
use crate::document::ReportDocument;
use crate::elements::{mm_from_f64, PageCanvas};
use crate::fonts;

/// Errors raised while turning a report into PDF bytes.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("no usable font family")]
    FontLoad(#[source] Error),
    #[error("PDF rendering failed")]
    Render(#[source] Error),
}

/// Builder for `genpdf::Document` instances pre-configured with the crate defaults.
#[derive(Default)]
pub struct DocumentBuilder {
    paper_size: Option<Size>,
    title: Option<String>,
}

impl DocumentBuilder {
    /// Creates a new builder instance with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder using the paper size of `layout`.
    pub fn for_layout(layout: &LayoutConfig) -> Self {
        Self::new().with_paper_size(Size::new(
            mm_from_f64(layout.page_width),
            mm_from_f64(layout.page_height),
        ))
    }

    /// Sets the paper size used for newly created documents.
    pub fn with_paper_size(mut self, paper_size: impl Into<Size>) -> Self {
        self.paper_size = Some(paper_size.into());
        self
    }

    /// Builds a `genpdf::Document` with the default font family loaded.
    pub fn build(self) -> Result<genpdf::Document, Error> {
        let font_family = fonts::default_font_family()?;
        let mut document = genpdf::Document::new(font_family);

        if let Some(paper_size) = self.paper_size {
            document.set_paper_size(paper_size);
        }
        if let Some(title) = self.title {
            document.set_title(title);
        }

        Ok(document)
    }

    /// Renders `report` into PDF bytes.
    ///
    /// The report title is stored in the PDF metadata.
    pub fn render(mut self, report: ReportDocument) -> Result<RenderedPdf, RenderError> {
        self.title = Some(report.title().to_string());
        let mut document = self.build().map_err(RenderError::FontLoad)?;

        let canvas = PageCanvas::new(report);
        let page_count = canvas.page_count();
        document.push(canvas);

        let mut bytes = Vec::new();
        document
            .render(&mut bytes)
            .map_err(RenderError::Render)?;
        debug!("rendered {} pages into {} bytes", page_count, bytes.len());

        Ok(RenderedPdf { bytes, page_count })
    }
}

/// A rendered PDF held in memory.
#[derive(Clone, Debug)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

impl RenderedPdf {
    /// Size of the rendered PDF in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
