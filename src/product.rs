//! Product records as delivered by the catalog endpoint.

use serde::{Deserialize, Deserializer};

/// One item of the fetched catalog and the unit row of the report table.
///
/// Fields that some catalog entries omit (`brand` is missing for groceries, for example) default
/// to an empty string, and so do text fields sent as `null`, so that a single sparse entry does not
/// reject the whole payload.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    /// Catalog identifier.
    pub id: u64,
    /// Display title; titles are not unique.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    /// Brand name, empty when the catalog does not provide one.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub brand: String,
    /// Category used for grouping.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub category: String,
    /// Unit price in dollars.
    #[serde(default)]
    pub price: f64,
    /// Average rating between 0 and 5.
    #[serde(default)]
    pub rating: f64,
    /// Name of the reviewer, if the catalog carries one.
    #[serde(default)]
    pub reviewer_name: Option<String>,
}

impl ProductRecord {
    /// Creates a record with the fields that drive aggregation.
    pub fn new(id: u64, title: impl Into<String>, category: impl Into<String>, price: f64) -> Self {
        Self {
            id,
            title: title.into(),
            category: category.into(),
            price,
            ..Self::default()
        }
    }

    /// Sets the brand and returns the updated record.
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    /// Sets the rating and returns the updated record.
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    /// Sets the reviewer name and returns the updated record.
    pub fn with_reviewer_name(mut self, reviewer_name: impl Into<Option<String>>) -> Self {
        self.reviewer_name = reviewer_name.into();
        self
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Envelope returned by the catalog endpoint.
///
/// Only `products` feeds the report; the paging counters are kept for logging.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CatalogPage {
    pub products: Vec<ProductRecord>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub skip: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_sparse_catalog_entries() {
        let payload = r#"{
            "products": [
                {"id": 1, "title": "Essence Mascara", "brand": "Essence", "category": "beauty",
                 "price": 9.99, "rating": 4.94, "stock": 5},
                {"id": 16, "title": "Apple", "category": "groceries", "price": 1.99, "rating": 2.96}
            ],
            "total": 194, "skip": 0, "limit": 30
        }"#;

        let page: CatalogPage = serde_json::from_str(payload).expect("payload parses");
        assert_eq!(page.products.len(), 2);
        assert_eq!(page.products[0].brand, "Essence");
        assert_eq!(page.products[1].brand, "");
        assert_eq!(page.products[1].reviewer_name, None);
        assert_eq!(page.total, Some(194));
    }

    #[test]
    fn null_text_fields_read_as_empty() {
        let page: CatalogPage = serde_json::from_str(
            r#"{"products": [
                {"id": 1, "title": "Essence Mascara", "brand": "Essence", "category": "beauty",
                 "price": 9.99, "rating": 4.94},
                {"id": 16, "title": "Apple", "brand": null, "category": "groceries",
                 "price": 1.99, "rating": 2.96, "reviewerName": null},
                {"id": 17, "title": null, "category": null, "price": 0.5}
            ]}"#,
        )
        .expect("payload parses");

        assert_eq!(page.products.len(), 3);
        assert_eq!(page.products[1].brand, "");
        assert_eq!(page.products[1].reviewer_name, None);
        assert_eq!(page.products[2].title, "");
        assert_eq!(page.products[2].category, "");
    }

    #[test]
    fn reads_camel_case_reviewer_name() {
        let record: ProductRecord = serde_json::from_str(
            r#"{"id": 3, "title": "Lamp", "category": "home", "price": 20, "reviewerName": "Ada"}"#,
        )
        .expect("record parses");
        assert_eq!(record.reviewer_name.as_deref(), Some("Ada"));
        assert_eq!(record.price, 20.0);
    }
}
