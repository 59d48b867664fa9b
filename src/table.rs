//! The product table: column projection, cell wrapping and pagination.
//!
//! Everything here is pure. Text widths come from a [`TextMeasure`], so rows can be measured and
//! split across pages before anything is drawn.

use std::fmt::Write as _;

use log::debug;

use crate::document::{line_height_mm, points_to_mm};
use crate::format::{format_price, format_rating, or_placeholder};
use crate::product::ProductRecord;

/// One table column: header text and width in millimetres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Column {
    pub title: &'static str,
    pub width: f64,
}

/// The canonical report columns; the widths span the 277 mm content width.
pub const COLUMNS: [Column; 7] = [
    Column { title: "Id", width: 14.0 },
    Column { title: "Title", width: 70.0 },
    Column { title: "Brand", width: 40.0 },
    Column { title: "Category", width: 40.0 },
    Column { title: "Price", width: 33.0 },
    Column { title: "Rating", width: 30.0 },
    Column { title: "Reviewer", width: 50.0 },
];

/// Header texts in column order.
pub fn header_cells() -> Vec<String> {
    COLUMNS.iter().map(|column| column.title.to_string()).collect()
}

/// Projects a record onto the table columns.
pub fn row_cells(record: &ProductRecord) -> Vec<String> {
    vec![
        record.id.to_string(),
        record.title.clone(),
        or_placeholder(Some(record.brand.as_str())).to_string(),
        record.category.clone(),
        format_price(record.price),
        format_rating(record.rating),
        or_placeholder(record.reviewer_name.as_deref()).to_string(),
    ]
}

/// Projects every record, keeping catalog order.
pub fn table_rows(products: &[ProductRecord]) -> Vec<Vec<String>> {
    products.iter().map(row_cells).collect()
}

/// Width of rendered text, in millimetres.
pub trait TextMeasure {
    fn text_width(&self, text: &str, font_size: u8) -> f64;
}

/// Estimates widths from an average glyph advance expressed as a fraction of the em size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AverageGlyphWidth {
    pub em_ratio: f64,
}

impl Default for AverageGlyphWidth {
    fn default() -> Self {
        Self { em_ratio: 0.55 }
    }
}

impl TextMeasure for AverageGlyphWidth {
    fn text_width(&self, text: &str, font_size: u8) -> f64 {
        text.chars().count() as f64 * points_to_mm(f64::from(font_size)) * self.em_ratio
    }
}

/// Splits `text` into lines no wider than `max_width`, breaking at spaces where possible and
/// inside words that do not fit on a line of their own.
pub fn wrap_text(
    text: &str,
    max_width: f64,
    font_size: u8,
    measure: &dyn TextMeasure,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if measure.text_width(&candidate, font_size) <= max_width {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        if measure.text_width(word, font_size) <= max_width {
            current = word.to_string();
        } else {
            for ch in word.chars() {
                current.push(ch);
                let too_wide = measure.text_width(&current, font_size) > max_width;
                if too_wide && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(ch);
                }
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Typography of the table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TableStyle {
    pub font_size: u8,
    pub cell_padding: f64,
}

impl TableStyle {
    pub fn line_height(&self) -> f64 {
        line_height_mm(self.font_size)
    }
}

/// A measured row with its cells wrapped into lines.
#[derive(Clone, Debug, PartialEq)]
pub struct TableRow {
    pub cells: Vec<Vec<String>>,
    pub height: f64,
    pub is_header: bool,
}

impl TableRow {
    fn measure(
        cells: &[String],
        is_header: bool,
        style: TableStyle,
        measure: &dyn TextMeasure,
    ) -> Self {
        let wrapped: Vec<Vec<String>> = cells
            .iter()
            .zip(COLUMNS.iter())
            .map(|(cell, column)| {
                let inner = (column.width - 2.0 * style.cell_padding).max(1.0);
                wrap_text(cell, inner, style.font_size, measure)
            })
            .collect();
        let line_count = wrapped.iter().map(Vec::len).max().unwrap_or(1).max(1);
        Self {
            height: line_count as f64 * style.line_height() + 2.0 * style.cell_padding,
            cells: wrapped,
            is_header,
        }
    }
}

/// A row placed at a vertical position.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedRow {
    pub top: f64,
    pub row: TableRow,
}

/// The part of the table printed on one page, header row first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableSlice {
    pub rows: Vec<PlacedRow>,
}

impl TableSlice {
    /// Rows other than the header.
    pub fn body_rows(&self) -> impl Iterator<Item = &PlacedRow> + '_ {
        self.rows.iter().filter(|placed| !placed.row.is_header)
    }

    /// Bottom edge of the last row.
    pub fn bottom(&self) -> f64 {
        self.rows
            .last()
            .map(|placed| placed.top + placed.row.height)
            .unwrap_or_default()
    }
}

/// Vertical bounds the table may occupy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TableBounds {
    /// Top edge on the first page.
    pub first_top: f64,
    /// Top edge on continuation pages.
    pub continuation_top: f64,
    /// No row extends below this.
    pub bottom_limit: f64,
}

/// Measures the rows and splits them into per-page slices.
///
/// Every slice starts with the header row. An empty table yields a single slice holding only the
/// header. A row taller than a whole page is placed alone on its page rather than dropped.
pub fn paginate(
    rows: &[Vec<String>],
    bounds: TableBounds,
    style: TableStyle,
    measure: &dyn TextMeasure,
) -> Vec<TableSlice> {
    let header = TableRow::measure(&header_cells(), true, style, measure);
    let start_slice = |top: f64| {
        let mut slice = TableSlice::default();
        slice.rows.push(PlacedRow {
            top,
            row: header.clone(),
        });
        slice
    };

    let mut slices = Vec::new();
    let mut slice = start_slice(bounds.first_top);

    for cells in rows {
        let row = TableRow::measure(cells, false, style, measure);
        let overflows = slice.bottom() + row.height > bounds.bottom_limit;
        if overflows && slice.body_rows().next().is_some() {
            slices.push(std::mem::replace(
                &mut slice,
                start_slice(bounds.continuation_top),
            ));
        }
        let top = slice.bottom();
        slice.rows.push(PlacedRow { top, row });
    }
    slices.push(slice);

    debug!("table of {} rows spans {} pages", rows.len(), slices.len());
    slices
}

/// Renders the table view as aligned plain text, one line per record.
pub fn render_text_table(products: &[ProductRecord]) -> String {
    let header = header_cells();
    let rows = table_rows(products);
    let widths: Vec<usize> = (0..header.len())
        .map(|index| {
            rows.iter()
                .map(|row| row[index].chars().count())
                .chain(std::iter::once(header[index].chars().count()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    let mut out = String::new();
    let mut write_row = |cells: &[String]| {
        let line = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" | ");
        let _ = writeln!(out, "{}", line.trim_end());
    };

    write_row(&header);
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    write_row(&rule);
    for row in &rows {
        write_row(row);
    }
    out
}
