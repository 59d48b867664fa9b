//! Positioned content of the exported report.
//!
//! A [`ReportDocument`] is a list of pages, each holding text blocks, lines, rectangles and images
//! at absolute coordinates in millimetres (origin at the top-left corner, y growing downwards).
//! The values are produced by [`crate::layout`] without touching the PDF renderer, so the whole
//! layout can be inspected and compared in tests.

use genpdf::style::Color;
use log::error;

use crate::richtext::{plain_text, Span};

/// Horizontal anchoring of a text block relative to its x coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HorizontalAlignment {
    /// `x` is the left edge of the block.
    #[default]
    Left,
    /// `x` is the centre of the block.
    Center,
    /// `x` is the right edge of the block.
    Right,
}

/// A point on the page, in millimetres.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// One line of styled text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextLine {
    spans: Vec<Span>,
}

impl TextLine {
    pub fn new(spans: impl Into<Vec<Span>>) -> Self {
        Self {
            spans: spans.into(),
        }
    }

    /// Single unstyled line.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(vec![Span::new(text)])
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// The line's text without styling.
    pub fn text(&self) -> String {
        plain_text(&self.spans)
    }
}

/// Lines of text sharing a font size and anchor.
///
/// The block is anchored by its widest line; the lines themselves are left aligned within the
/// block, which keeps stacked lines such as the two timestamps flush with each other.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    origin: Point,
    lines: Vec<TextLine>,
    alignment: HorizontalAlignment,
    font_size: u8,
    line_height: f64,
    color: Option<Color>,
}

impl TextBlock {
    /// Creates a left-anchored block whose first line's top edge is at `origin`.
    pub fn new(origin: Point, font_size: u8, lines: impl Into<Vec<TextLine>>) -> Self {
        Self {
            origin,
            lines: lines.into(),
            alignment: HorizontalAlignment::Left,
            font_size,
            line_height: line_height_mm(font_size),
            color: None,
        }
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn lines(&self) -> &[TextLine] {
        &self.lines
    }

    pub fn alignment(&self) -> HorizontalAlignment {
        self.alignment
    }

    pub fn font_size(&self) -> u8 {
        self.font_size
    }

    /// Distance between consecutive line tops, in millimetres.
    pub fn line_height(&self) -> f64 {
        self.line_height
    }

    /// Colour applied to spans that do not carry their own.
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Bottom edge of the last line.
    pub fn bottom(&self) -> f64 {
        self.origin.y + self.line_height * self.lines.len() as f64
    }

    pub fn with_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }
}

/// A straight stroke between two points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line {
    pub from: Point,
    pub to: Point,
    pub color: Color,
}

/// An axis-aligned rectangle with an optional outline and fill.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub origin: Point,
    pub width: f64,
    pub height: f64,
    pub stroke: Option<Color>,
    pub fill: Option<Color>,
}

impl Rect {
    /// Outline-only rectangle.
    pub fn outlined(origin: Point, width: f64, height: f64, stroke: Color) -> Self {
        Self {
            origin,
            width,
            height,
            stroke: Some(stroke),
            fill: None,
        }
    }

    /// Sets the fill colour and returns the updated rectangle.
    pub fn filled(mut self, fill: Color) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn bottom(&self) -> f64 {
        self.origin.y + self.height
    }
}

/// Encoded image bytes (PNG, JPEG, ...) placed on a page.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageSource(Vec<u8>);

impl ImageSource {
    /// Creates a new in-memory image from raw bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }
}

/// An image stretched into a rectangle.
#[derive(Clone, Debug, PartialEq)]
pub struct ImagePlacement {
    pub source: ImageSource,
    pub origin: Point,
    pub width: f64,
    pub height: f64,
}

impl ImagePlacement {
    pub fn bottom(&self) -> f64 {
        self.origin.y + self.height
    }
}

/// Anything that can be drawn on a page.
#[derive(Clone, Debug, PartialEq)]
pub enum PageElement {
    Text(TextBlock),
    Line(Line),
    Rect(Rect),
    Image(ImagePlacement),
}

impl PageElement {
    /// Lowest y coordinate covered by the element.
    pub fn bottom(&self) -> f64 {
        match self {
            PageElement::Text(block) => block.bottom(),
            PageElement::Line(line) => line.from.y.max(line.to.y),
            PageElement::Rect(rect) => rect.bottom(),
            PageElement::Image(image) => image.bottom(),
        }
    }
}

/// One page of the report.
///
/// Elements are drawn in insertion order. Content elements move the page's lowest content
/// boundary; decorations (border, footer) do not.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    elements: Vec<PageElement>,
    content_bottom: f64,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elements(&self) -> &[PageElement] {
        &self.elements
    }

    /// Largest bottom edge of the content placed so far.
    pub fn content_bottom(&self) -> f64 {
        self.content_bottom
    }

    /// Adds a content element.
    pub fn push(&mut self, element: PageElement) {
        let bottom = element.bottom();
        if bottom.is_finite() {
            self.content_bottom = self.content_bottom.max(bottom);
        }
        self.elements.push(element);
    }

    /// Adds an element that does not count as content.
    pub fn push_decoration(&mut self, element: PageElement) {
        self.elements.push(element);
    }

    pub fn push_text(&mut self, block: TextBlock) {
        self.push(PageElement::Text(block));
    }

    /// Adds a content line. Lines with non-finite coordinates are logged and skipped.
    pub fn push_line(&mut self, from: Point, to: Point, color: Color) -> bool {
        match checked_line(from, to, color) {
            Some(line) => {
                self.push(PageElement::Line(line));
                true
            }
            None => false,
        }
    }

    /// Adds a decoration line. Lines with non-finite coordinates are logged and skipped.
    pub fn push_decoration_line(&mut self, from: Point, to: Point, color: Color) -> bool {
        match checked_line(from, to, color) {
            Some(line) => {
                self.push_decoration(PageElement::Line(line));
                true
            }
            None => false,
        }
    }

    pub fn push_rect(&mut self, rect: Rect) {
        self.push(PageElement::Rect(rect));
    }

    pub fn push_image(&mut self, image: ImagePlacement) {
        self.push(PageElement::Image(image));
    }

    /// Iterates over the text blocks on the page.
    pub fn text_blocks(&self) -> impl Iterator<Item = &TextBlock> + '_ {
        self.elements.iter().filter_map(|element| match element {
            PageElement::Text(block) => Some(block),
            _ => None,
        })
    }

    /// The unstyled text of every line on the page, in drawing order.
    pub fn text_lines(&self) -> Vec<String> {
        self.text_blocks()
            .flat_map(|block| block.lines().iter().map(TextLine::text))
            .collect()
    }

    /// Iterates over the images on the page.
    pub fn images(&self) -> impl Iterator<Item = &ImagePlacement> + '_ {
        self.elements.iter().filter_map(|element| match element {
            PageElement::Image(image) => Some(image),
            _ => None,
        })
    }
}

fn checked_line(from: Point, to: Point, color: Color) -> Option<Line> {
    if from.is_finite() && to.is_finite() {
        Some(Line { from, to, color })
    } else {
        error!(
            "Invalid coordinate for line from ({}, {}) to ({}, {}); skipping",
            from.x, from.y, to.x, to.y
        );
        None
    }
}

/// The full report: a title and its pages in print order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReportDocument {
    title: String,
    pages: Vec<Page>,
}

impl ReportDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            pages: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn push_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    pub fn pages_mut(&mut self) -> &mut [Page] {
        &mut self.pages
    }

    /// Consumes the document and returns its pages.
    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }
}

const MM_PER_POINT: f64 = 25.4 / 72.0;
const LINE_HEIGHT_FACTOR: f64 = 1.15;

/// Height of one text line at `font_size` points, in millimetres.
pub fn line_height_mm(font_size: u8) -> f64 {
    f64::from(font_size) * MM_PER_POINT * LINE_HEIGHT_FACTOR
}

/// Converts a font size in points to millimetres.
pub fn points_to_mm(points: f64) -> f64 {
    points * MM_PER_POINT
}
