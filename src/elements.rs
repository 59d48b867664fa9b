//! `genpdf` elements that draw a laid-out [`ReportDocument`].
//!
//! `genpdf` flows content top to bottom, while the report places everything at absolute
//! coordinates. [`PageCanvas`] bridges the two: it is a single element that draws one report page
//! per call and asks for another page until every page has been drawn.

use image::{DynamicImage, GenericImageView, Rgb, RgbImage};

use genpdf::elements::Image;
use genpdf::error::{Context as _, Error};
use genpdf::style::{Color, Style, StyledString};
use genpdf::{render, Element, Mm, Position, RenderResult, Scale};
use log::warn;

use crate::document::{
    HorizontalAlignment, ImagePlacement, ImageSource, Line, Page, PageElement, Point, Rect,
    ReportDocument, TextBlock,
};

const DEFAULT_IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

fn position(point: Point) -> Position {
    Position::new(mm_from_f64(point.x), mm_from_f64(point.y))
}

/// Natural size of `image` at `dpi`, in millimetres.
fn estimated_image_size(image: &DynamicImage, dpi: f64) -> (f64, f64) {
    let (px_width, px_height) = image.dimensions();
    (
        MM_PER_INCH * f64::from(px_width) / dpi,
        MM_PER_INCH * f64::from(px_height) / dpi,
    )
}

/// Loads an image from in-memory bytes using the [`image`] crate with descriptive errors.
pub fn decode_image_from_bytes(bytes: impl AsRef<[u8]>) -> Result<DynamicImage, Error> {
    image::load_from_memory(bytes.as_ref()).context("Failed to decode image from provided bytes")
}

/// Decodes the bytes of an [`ImageSource`].
pub fn decode_image(source: &ImageSource) -> Result<DynamicImage, Error> {
    decode_image_from_bytes(source.bytes())
}

/// Blends transparent pixels over white; `genpdf` rejects images with an alpha channel.
pub fn flatten_alpha(image: DynamicImage) -> DynamicImage {
    if !image.color().has_alpha() {
        return image;
    }

    let rgba = image.to_rgba8();
    let mut rgb = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = u16::from(a);
        let blend =
            |channel: u8| ((u16::from(channel) * alpha + 255 * (255 - alpha)) / 255) as u8;
        rgb.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
    }
    DynamicImage::ImageRgb8(rgb)
}

fn color_to_rgb(color: Color) -> [u8; 3] {
    match color {
        Color::Rgb(r, g, b) => [r, g, b],
        Color::Greyscale(value) => [value; 3],
        Color::Cmyk(c, m, y, k) => {
            let channel = |value: u8| {
                let keep = (255 - u16::from(value)) * (255 - u16::from(k)) / 255;
                keep as u8
            };
            [channel(c), channel(m), channel(y)]
        }
    }
}

/// A single pixel of `color`, stretched by [`PageCanvas`] to fill rectangles.
fn solid_fill(color: Color) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb(color_to_rgb(color))))
}

/// Converts `image` into a `genpdf` image stretched over `width` x `height` millimetres at
/// `origin`.
fn placed_image(
    image: DynamicImage,
    origin: Point,
    width: f64,
    height: f64,
) -> Result<Image, Error> {
    let (natural_width, natural_height) = estimated_image_size(&image, DEFAULT_IMAGE_DPI);
    let mut element = Image::from_dynamic_image(flatten_alpha(image))?;
    element.set_dpi(DEFAULT_IMAGE_DPI);
    element.set_position(position(origin));
    if natural_width > f64::EPSILON && natural_height > f64::EPSILON {
        element.set_scale(Scale::new(width / natural_width, height / natural_height));
    }
    Ok(element)
}

/// Draws the pages of a [`ReportDocument`], one per `render` call.
pub struct PageCanvas {
    pages: Vec<Page>,
    next: usize,
}

impl PageCanvas {
    pub fn new(document: ReportDocument) -> Self {
        Self {
            pages: document.into_pages(),
            next: 0,
        }
    }

    /// Number of pages the canvas will draw.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

impl Element for PageCanvas {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let mut result = RenderResult::default();
        let Some(page) = self.pages.get(self.next) else {
            return Ok(result);
        };

        for element in page.elements() {
            match element {
                PageElement::Text(block) => draw_text(context, &area, style, block)?,
                PageElement::Line(line) => draw_line(&area, line),
                PageElement::Rect(rect) => draw_rect(context, &area, style, rect)?,
                PageElement::Image(placement) => draw_image(context, &area, style, placement)?,
            }
        }

        self.next += 1;
        result.size = area.size();
        result.has_more = self.next < self.pages.len();
        Ok(result)
    }
}

fn draw_line(area: &render::Area<'_>, line: &Line) {
    area.draw_line(
        vec![position(line.from), position(line.to)],
        Style::new().with_color(line.color),
    );
}

fn draw_rect(
    context: &genpdf::Context,
    area: &render::Area<'_>,
    style: Style,
    rect: &Rect,
) -> Result<(), Error> {
    if let Some(fill) = rect.fill {
        let mut image = placed_image(solid_fill(fill), rect.origin, rect.width, rect.height)?;
        image.render(context, area.clone(), style)?;
    }

    if let Some(stroke) = rect.stroke {
        let Point { x, y } = rect.origin;
        let right = x + rect.width;
        let bottom = y + rect.height;
        let corners = [
            Point::new(x, y),
            Point::new(right, y),
            Point::new(right, bottom),
            Point::new(x, bottom),
            Point::new(x, y),
        ];
        area.draw_line(
            corners.iter().copied().map(position).collect::<Vec<_>>(),
            Style::new().with_color(stroke),
        );
    }
    Ok(())
}

fn draw_image(
    context: &genpdf::Context,
    area: &render::Area<'_>,
    style: Style,
    placement: &ImagePlacement,
) -> Result<(), Error> {
    let decoded = decode_image(&placement.source)?;
    let mut image = placed_image(decoded, placement.origin, placement.width, placement.height)?;
    image.render(context, area.clone(), style)?;
    Ok(())
}

fn draw_text(
    context: &genpdf::Context,
    area: &render::Area<'_>,
    style: Style,
    block: &TextBlock,
) -> Result<(), Error> {
    let mut base = style;
    base.set_font_size(block.font_size());

    let lines: Vec<Vec<StyledString>> = block
        .lines()
        .iter()
        .map(|line| {
            line.spans()
                .iter()
                .map(|span| {
                    let mut string = span.clone().or_colored(block.color()).to_styled_string();
                    string.style = base.and(string.style);
                    string
                })
                .collect()
        })
        .collect();

    let block_width = lines
        .iter()
        .map(|line| {
            line.iter()
                .map(|string| mm_to_f64(string.width(&context.font_cache)))
                .sum::<f64>()
        })
        .fold(0.0, f64::max);

    let origin = block.origin();
    let left = match block.alignment() {
        HorizontalAlignment::Left => origin.x,
        HorizontalAlignment::Center => origin.x - block_width / 2.0,
        HorizontalAlignment::Right => origin.x - block_width,
    };

    for (index, line) in lines.iter().enumerate() {
        let top = origin.y + block.line_height() * index as f64;
        let at = Point::new(left, top);
        match area.text_section(&context.font_cache, position(at), base) {
            Some(mut section) => {
                for string in line {
                    section.print_str(&string.s, string.style)?;
                }
            }
            None => warn!(
                "Text line at ({:.1}, {:.1}) does not fit on the page; skipping",
                at.x, at.y
            ),
        }
    }
    Ok(())
}
