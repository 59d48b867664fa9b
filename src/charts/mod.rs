//! Chart series derived from the product collection.
//!
//! The series are plain projections: no filtering, no sorting. [`svg`] turns them into chart
//! markup and [`raster`] turns that markup into the bitmaps embedded in the report.

pub mod raster;
pub mod svg;

use crate::aggregate::CategoryTotals;
use crate::product::ProductRecord;

/// Legend label of the per-product price series.
pub const PRICE_SERIES_LABEL: &str = "Product Price";

/// Legend label of the per-category series.
pub const CATEGORY_SERIES_LABEL: &str = "Product Categories";

/// Index-aligned labels and values of one chart.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChartSeries {
    label: String,
    labels: Vec<String>,
    values: Vec<f64>,
}

impl ChartSeries {
    /// Creates a series from label/value pairs.
    pub fn from_pairs<I, S>(label: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let (labels, values) = pairs
            .into_iter()
            .map(|(label, value)| (label.into(), value))
            .unzip();
        Self {
            label: label.into(),
            labels,
            values,
        }
    }

    /// Legend label for the whole series.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over `(label, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Per-product price series: titles and prices in input order.
pub fn price_series(products: &[ProductRecord]) -> ChartSeries {
    ChartSeries::from_pairs(
        PRICE_SERIES_LABEL,
        products
            .iter()
            .map(|product| (product.title.as_str(), product.price)),
    )
}

/// Per-category series in the order of the totals mapping.
pub fn category_series(totals: &CategoryTotals) -> ChartSeries {
    ChartSeries::from_pairs(CATEGORY_SERIES_LABEL, totals.iter())
}

/// Both series feeding the report charts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChartData {
    pub price: ChartSeries,
    pub category: ChartSeries,
}

impl ChartData {
    /// Projects the products and their category totals into chart series.
    pub fn build(products: &[ProductRecord], totals: &CategoryTotals) -> Self {
        Self {
            price: price_series(products),
            category: category_series(totals),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::group_by_category;

    fn products() -> Vec<ProductRecord> {
        vec![
            ProductRecord::new(1, "Widget", "tools", 4.5),
            ProductRecord::new(2, "Gadget", "toys", 12.0),
            ProductRecord::new(3, "Widget", "tools", 5.5),
        ]
    }

    #[test]
    fn price_series_keeps_duplicate_titles() {
        let series = price_series(&products());
        assert_eq!(series.label(), PRICE_SERIES_LABEL);
        assert_eq!(series.labels(), ["Widget", "Gadget", "Widget"]);
        assert_eq!(series.values(), [4.5, 12.0, 5.5]);
    }

    #[test]
    fn category_series_matches_totals() {
        let products = products();
        let totals = group_by_category(&products);
        let data = ChartData::build(&products, &totals);

        assert_eq!(data.category.len(), totals.len());
        assert_eq!(data.category.labels(), ["tools", "toys"]);
        assert_eq!(data.category.values(), [10.0, 12.0]);
        assert_eq!(data.price.len(), products.len());
    }

    #[test]
    fn empty_products_give_empty_series() {
        let data = ChartData::build(&[], &group_by_category(&[]));
        assert!(data.price.is_empty());
        assert!(data.category.is_empty());
    }
}
