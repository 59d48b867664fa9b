//! Page layout of the report.
//!
//! [`ReportLayout`] places every element of the report on absolute page coordinates and returns a
//! [`ReportDocument`]. The layout is pure: the same inputs always give the same document, and
//! nothing here touches the PDF renderer.
//!
//! Page order is fixed: the table pages (the first one carrying the metadata block), then one
//! chart page. Every page gets the border and the header band; the footer is added in a final pass
//! once the page count is known.

use log::{debug, warn};

use crate::charts::raster::ChartImages;
use crate::config::{LayoutConfig, Slot};
use crate::document::{
    HorizontalAlignment, ImagePlacement, ImageSource, Page, PageElement, Point,
    Rect, ReportDocument, TextBlock, TextLine,
};
use crate::format::{page_label, ReportTimestamps};
use crate::product::ProductRecord;
use crate::richtext::{parse_markup, Span};
use crate::table::{
    paginate, table_rows, TableBounds, TableSlice, TableStyle, TextMeasure, COLUMNS,
};

/// Everything that varies between two exports of the report.
#[derive(Clone, Copy, Debug)]
pub struct ReportContent<'a> {
    pub products: &'a [ProductRecord],
    pub logo: &'a ImageSource,
    pub charts: &'a ChartImages,
    pub timestamps: &'a ReportTimestamps,
}

/// Lays out the report on the pages described by a [`LayoutConfig`].
pub struct ReportLayout<'a> {
    config: &'a LayoutConfig,
    measure: &'a dyn TextMeasure,
}

impl<'a> ReportLayout<'a> {
    pub fn new(config: &'a LayoutConfig, measure: &'a dyn TextMeasure) -> Self {
        Self { config, measure }
    }

    /// Lays out the complete report.
    pub fn layout(&self, content: &ReportContent<'_>) -> ReportDocument {
        let slices = paginate(
            &table_rows(content.products),
            self.table_bounds(),
            self.table_style(),
            self.measure,
        );

        let mut document = ReportDocument::new(self.config.title.clone());
        for (index, slice) in slices.iter().enumerate() {
            let mut page = self.new_page(content.logo);
            if index == 0 {
                self.metadata_block(&mut page, content.timestamps);
            }
            self.table_slice(&mut page, slice);
            document.push_page(page);
        }

        let mut chart_page = self.new_page(content.logo);
        self.chart_images(&mut chart_page, content.charts);
        document.push_page(chart_page);

        self.decorate(&mut document);
        debug!(
            "laid out {} records on {} pages",
            content.products.len(),
            document.page_count()
        );
        document
    }

    fn table_style(&self) -> TableStyle {
        TableStyle {
            font_size: self.config.table_font_size,
            cell_padding: self.config.table_cell_padding,
        }
    }

    fn table_bounds(&self) -> TableBounds {
        TableBounds {
            first_top: self.config.metadata_rule_y + self.config.table_gap,
            continuation_top: self.config.header_rule_y() + self.config.table_gap,
            bottom_limit: self.config.table_bottom_limit,
        }
    }

    /// A fresh page with the border and the header band.
    fn new_page(&self, logo: &ImageSource) -> Page {
        let config = self.config;
        let palette = &config.palette;
        let mut page = Page::new();

        let inset = config.border_inset;
        page.push_decoration(PageElement::Rect(Rect::outlined(
            Point::new(inset, inset),
            config.page_width - 2.0 * inset,
            config.page_height - 2.0 * inset,
            palette.accent,
        )));

        page.push_image(placement(logo.clone(), config.logo));
        page.push_text(
            TextBlock::new(
                Point::new(config.content_right(), config.title_top),
                config.title_font_size,
                vec![TextLine::new(vec![Span::new(config.title.clone()).italic()])],
            )
            .with_alignment(HorizontalAlignment::Right)
            .with_color(palette.title),
        );

        let rule_y = config.header_rule_y();
        page.push_line(
            Point::new(config.margin, rule_y),
            Point::new(config.content_right(), rule_y),
            palette.accent,
        );
        page
    }

    /// Heading, description and timestamps on the first page.
    fn metadata_block(&self, page: &mut Page, timestamps: &ReportTimestamps) {
        let config = self.config;
        let palette = &config.palette;

        page.push_text(
            TextBlock::new(
                Point::new(config.page_width / 2.0, config.heading_top),
                config.heading_font_size,
                vec![TextLine::new(vec![Span::new(config.heading.clone()).bold()])],
            )
            .with_alignment(HorizontalAlignment::Center)
            .with_color(palette.heading),
        );

        let spans = match parse_markup(&config.description) {
            Ok(spans) => spans,
            Err(err) => {
                warn!(
                    "Report description markup is invalid ({}); printing it verbatim",
                    err
                );
                vec![Span::new(config.description.clone())]
            }
        };
        let lines = wrap_spans(
            &spans,
            config.content_width(),
            config.description_font_size,
            self.measure,
        );
        page.push_text(
            TextBlock::new(
                Point::new(config.margin, config.description_top),
                config.description_font_size,
                lines,
            )
            .with_color(palette.body),
        );

        page.push_text(
            TextBlock::new(
                Point::new(config.content_right(), config.timestamp_top),
                config.timestamp_font_size,
                timestamps
                    .lines()
                    .iter()
                    .map(|line| TextLine::plain(*line))
                    .collect::<Vec<_>>(),
            )
            .with_alignment(HorizontalAlignment::Right)
            .with_color(palette.heading),
        );

        let rule_y = config.metadata_rule_y;
        page.push_line(
            Point::new(config.margin, rule_y),
            Point::new(config.content_right(), rule_y),
            palette.accent,
        );
    }

    fn table_slice(&self, page: &mut Page, slice: &TableSlice) {
        let config = self.config;
        let palette = &config.palette;
        let style = self.table_style();

        for placed in &slice.rows {
            let row = &placed.row;
            let mut left = config.margin;
            for (column, lines) in COLUMNS.iter().zip(&row.cells) {
                let mut cell = Rect::outlined(
                    Point::new(left, placed.top),
                    column.width,
                    row.height,
                    palette.table_grid,
                );
                if row.is_header {
                    cell = cell.filled(palette.table_header_fill);
                }
                page.push_rect(cell);

                let text_height = lines.len() as f64 * style.line_height();
                let top = placed.top + (row.height - text_height) / 2.0;
                let text_lines: Vec<TextLine> = lines
                    .iter()
                    .map(|line| {
                        let span = Span::new(line.clone());
                        TextLine::new(vec![if row.is_header { span.bold() } else { span }])
                    })
                    .collect();
                let color = if row.is_header {
                    palette.table_header_text
                } else {
                    palette.body
                };
                page.push_text(
                    TextBlock::new(
                        Point::new(left + column.width / 2.0, top),
                        style.font_size,
                        text_lines,
                    )
                    .with_alignment(HorizontalAlignment::Center)
                    .with_color(color),
                );

                left += column.width;
            }
        }
    }

    /// Places the chart bitmaps, bar chart first. Missing charts leave their slot empty.
    fn chart_images(&self, page: &mut Page, charts: &ChartImages) {
        let config = self.config;
        let right = config.page_width - config.border_inset - 1.0;
        let bottom = config.border_bottom() - 1.0;

        let slots = [
            (&charts.price, config.price_chart),
            (&charts.category, config.category_chart),
        ];
        for (image, slot) in slots {
            if let Some(source) = image {
                page.push_image(placement(source.clone(), fit_within(slot, right, bottom)));
            }
        }
        if charts.is_empty() {
            debug!("no chart images; chart page left empty");
        }
    }

    /// Adds the footer rule, watermark and page label to every page.
    fn decorate(&self, document: &mut ReportDocument) {
        let config = self.config;
        let palette = &config.palette;
        let total = document.page_count();
        let border_bottom = config.border_bottom();
        let rule_limit = border_bottom - 8.0;
        let text_limit = border_bottom - 5.0;

        for (index, page) in document.pages_mut().iter_mut().enumerate() {
            let content_bottom = page.content_bottom();
            let rule_y = (content_bottom + config.footer_rule_offset).min(rule_limit);
            let text_top = (content_bottom + config.footer_text_offset).min(text_limit);

            page.push_decoration_line(
                Point::new(config.margin, rule_y),
                Point::new(config.content_right(), rule_y),
                palette.accent,
            );
            page.push_decoration(PageElement::Text(
                TextBlock::new(
                    Point::new(config.margin, text_top),
                    config.watermark_font_size,
                    vec![TextLine::new(vec![Span::new(config.watermark.clone()).italic()])],
                )
                .with_color(palette.watermark),
            ));
            page.push_decoration(PageElement::Text(
                TextBlock::new(
                    Point::new(config.content_right(), text_top),
                    config.page_number_font_size,
                    vec![TextLine::plain(page_label(index + 1, total))],
                )
                .with_alignment(HorizontalAlignment::Right)
                .with_color(palette.watermark),
            ));
        }
    }
}

/// Lays out the report with `config`; see [`ReportLayout::layout`].
pub fn layout_report(
    config: &LayoutConfig,
    measure: &dyn TextMeasure,
    content: &ReportContent<'_>,
) -> ReportDocument {
    ReportLayout::new(config, measure).layout(content)
}

fn placement(source: ImageSource, slot: Slot) -> ImagePlacement {
    ImagePlacement {
        source,
        origin: slot.origin,
        width: slot.width,
        height: slot.height,
    }
}

/// Shrinks `slot`, keeping its origin and aspect ratio, until it ends left of `right` and above
/// `bottom`.
pub fn fit_within(slot: Slot, right: f64, bottom: f64) -> Slot {
    let available_width = right - slot.origin.x;
    let available_height = bottom - slot.origin.y;
    if slot.width <= 0.0 || slot.height <= 0.0 {
        return slot;
    }

    let scale = (available_width / slot.width)
        .min(available_height / slot.height)
        .min(1.0)
        .max(0.0);
    Slot::new(
        slot.origin.x,
        slot.origin.y,
        slot.width * scale,
        slot.height * scale,
    )
}

/// Greedy word wrap over styled spans. Breaks only at spaces; styling is kept per word.
pub fn wrap_spans(
    spans: &[Span],
    max_width: f64,
    font_size: u8,
    measure: &dyn TextMeasure,
) -> Vec<TextLine> {
    let mut lines = Vec::new();
    let mut current: Vec<Span> = Vec::new();
    let mut width = 0.0;

    for span in spans {
        for piece in span.text().split_inclusive(' ') {
            let word_width = measure.text_width(piece.trim_end(), font_size);
            if !current.is_empty() && width + word_width > max_width {
                lines.push(finish_line(std::mem::take(&mut current)));
                width = 0.0;
            }
            if current.is_empty() && piece.trim().is_empty() {
                continue;
            }
            width += measure.text_width(piece, font_size);
            current.push(span.with_text(piece));
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(finish_line(current));
    }
    lines
}

fn finish_line(mut spans: Vec<Span>) -> TextLine {
    if let Some(last) = spans.pop() {
        let trimmed = last.text().trim_end();
        if !trimmed.is_empty() {
            spans.push(last.with_text(trimmed));
        }
    }
    TextLine::new(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::AverageGlyphWidth;
    use chrono::{FixedOffset, TimeZone};

    fn timestamps() -> ReportTimestamps {
        let instant = FixedOffset::east_opt(0)
            .expect("valid offset")
            .with_ymd_and_hms(2024, 3, 5, 14, 7, 9)
            .single()
            .expect("valid instant");
        ReportTimestamps::at(&instant)
    }

    fn products(count: u64) -> Vec<ProductRecord> {
        (1..=count)
            .map(|id| {
                ProductRecord::new(id, format!("Product {}", id), "beauty", id as f64)
                    .with_brand("Essence")
                    .with_rating(4.5)
            })
            .collect()
    }

    fn layout(products: &[ProductRecord], charts: &ChartImages) -> ReportDocument {
        let config = LayoutConfig::default();
        let measure = AverageGlyphWidth::default();
        let logo = ImageSource::from_bytes(b"logo".to_vec());
        let stamps = timestamps();
        layout_report(
            &config,
            &measure,
            &ReportContent {
                products,
                logo: &logo,
                charts,
                timestamps: &stamps,
            },
        )
    }

    fn both_charts() -> ChartImages {
        ChartImages {
            price: Some(ImageSource::from_bytes(vec![1])),
            category: Some(ImageSource::from_bytes(vec![2])),
        }
    }

    #[test]
    fn empty_catalog_gives_header_only_table_and_chart_page() {
        let document = layout(&[], &ChartImages::none());
        assert_eq!(document.page_count(), 2);

        let first = document.pages()[0].text_lines();
        assert!(first.contains(&"Final Report".to_string()));
        assert!(first.contains(&"Id".to_string()));
        assert!(first.contains(&"Reviewer".to_string()));
        assert!(first.contains(&"Report created on: Tuesday, March 5, 2024".to_string()));
        assert!(first.contains(&"Scanned on: 2:07:09 PM".to_string()));
        assert!(first.contains(&"Page 1 of 2".to_string()));
    }

    #[test]
    fn every_page_has_border_header_and_footer() {
        let document = layout(&products(60), &both_charts());
        let total = document.page_count();
        assert!(total >= 3, "60 rows should need more than one table page");

        for (index, page) in document.pages().iter().enumerate() {
            let lines = page.text_lines();
            assert!(lines.contains(&"Elogix Report".to_string()));
            assert!(lines.contains(&"Powered by Elogix".to_string()));
            let label = format!("Page {} of {}", index + 1, total);
            assert_eq!(lines.iter().filter(|line| **line == label).count(), 1);
            assert!(matches!(page.elements()[0], PageElement::Rect(_)));
        }
    }

    #[test]
    fn header_title_is_italic() {
        let document = layout(&[], &ChartImages::none());
        for page in document.pages() {
            let title = page
                .text_blocks()
                .flat_map(TextBlock::lines)
                .flat_map(TextLine::spans)
                .find(|span| span.text() == "Elogix Report")
                .expect("header title present");
            assert!(title.is_italic() && !title.is_bold());
        }
    }

    #[test]
    fn metadata_block_only_on_first_page() {
        let document = layout(&products(60), &ChartImages::none());
        let heading = "Final Report".to_string();
        assert!(document.pages()[0].text_lines().contains(&heading));
        for page in &document.pages()[1..] {
            assert!(!page.text_lines().contains(&heading));
        }
    }

    #[test]
    fn every_record_is_printed_once_in_order() {
        let records = products(45);
        let document = layout(&records, &ChartImages::none());
        let titles: Vec<String> = document
            .pages()
            .iter()
            .flat_map(Page::text_lines)
            .filter(|line| line.starts_with("Product "))
            .collect();
        let expected: Vec<String> = records.iter().map(|record| record.title.clone()).collect();
        assert_eq!(titles, expected);
    }

    #[test]
    fn table_rows_stay_above_the_limit() {
        let config = LayoutConfig::default();
        let document = layout(&products(80), &ChartImages::none());
        let table_pages = &document.pages()[..document.page_count() - 1];
        for page in table_pages {
            for element in page.elements() {
                if let PageElement::Rect(rect) = element {
                    if rect.stroke == Some(config.palette.table_grid) {
                        assert!(rect.bottom() <= config.table_bottom_limit + 1e-9);
                    }
                }
            }
        }
    }

    #[test]
    fn chart_page_holds_logo_and_fitted_charts() {
        let config = LayoutConfig::default();
        let document = layout(&products(3), &both_charts());
        let chart_page = document.pages().last().expect("chart page");
        let images: Vec<&ImagePlacement> = chart_page.images().collect();
        assert_eq!(images.len(), 3);
        assert_eq!(images[1].source, ImageSource::from_bytes(vec![1]));
        assert_eq!(images[2].source, ImageSource::from_bytes(vec![2]));

        let border_right = config.page_width - config.border_inset;
        for image in images {
            assert!(image.origin.x + image.width < border_right);
            assert!(image.bottom() < config.border_bottom());
        }
    }

    #[test]
    fn missing_charts_leave_chart_page_empty() {
        let document = layout(&products(3), &ChartImages::none());
        let chart_page = document.pages().last().expect("chart page");
        assert_eq!(chart_page.images().count(), 1);
        assert_eq!(chart_page.text_lines().len(), 3);
    }

    #[test]
    fn footer_follows_lowest_content() {
        let config = LayoutConfig::default();
        let document = layout(&products(1), &ChartImages::none());
        let page = &document.pages()[0];
        let label = page
            .text_blocks()
            .find(|block| block.lines()[0].text() == "Page 1 of 2")
            .expect("page label");
        assert!(
            (label.origin().y - (page.content_bottom() + config.footer_text_offset)).abs() < 1e-9
        );
        assert_eq!(label.alignment(), HorizontalAlignment::Right);
    }

    #[test]
    fn footer_is_clamped_inside_border() {
        let config = LayoutConfig::default();
        let document = layout(&products(3), &both_charts());
        for page in document.pages() {
            for block in page.text_blocks() {
                assert!(block.bottom() < config.border_bottom());
            }
        }
    }

    #[test]
    fn layout_is_deterministic() {
        let records = products(25);
        assert_eq!(
            layout(&records, &both_charts()),
            layout(&records, &both_charts())
        );
    }

    #[test]
    fn invalid_description_markup_is_printed_verbatim() {
        let config = LayoutConfig {
            description: "**unterminated".to_string(),
            ..LayoutConfig::default()
        };
        let measure = AverageGlyphWidth::default();
        let logo = ImageSource::from_bytes(b"logo".to_vec());
        let stamps = timestamps();
        let document = layout_report(
            &config,
            &measure,
            &ReportContent {
                products: &[],
                logo: &logo,
                charts: &ChartImages::none(),
                timestamps: &stamps,
            },
        );
        assert!(document.pages()[0]
            .text_lines()
            .contains(&"**unterminated".to_string()));
    }

    #[test]
    fn fit_within_keeps_aspect_ratio() {
        let fitted = fit_within(Slot::new(169.0, 40.0, 140.0, 95.0), 291.0, 204.0);
        assert_eq!(fitted.origin, Point::new(169.0, 40.0));
        assert!((fitted.width - 122.0).abs() < 1e-9);
        assert!((fitted.width / fitted.height - 140.0 / 95.0).abs() < 1e-9);

        let untouched = fit_within(Slot::new(10.0, 62.0, 140.0, 100.0), 291.0, 204.0);
        assert_eq!(untouched, Slot::new(10.0, 62.0, 140.0, 100.0));
    }

    #[test]
    fn wrap_spans_keeps_styles_per_word() {
        let spans = vec![Span::new("Label:").bold(), Span::new(" one two three")];
        let measure = AverageGlyphWidth::default();
        let width = measure.text_width("Label: one", 10);
        let lines = wrap_spans(&spans, width + 0.01, 10, &measure);

        let texts: Vec<String> = lines.iter().map(TextLine::text).collect();
        assert_eq!(texts, vec!["Label: one", "two three"]);
        assert!(lines[0].spans()[0].is_bold());
        assert!(!lines[1].spans()[0].is_bold());
    }
}
