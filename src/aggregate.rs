//! Grouping of product prices by category.

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::product::ProductRecord;

/// Summed prices per category, ordered by the first occurrence of each category.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CategoryTotals {
    totals: IndexMap<String, f64>,
}

impl CategoryTotals {
    /// Returns the total for `category`, if it occurs in the input.
    pub fn get(&self, category: &str) -> Option<f64> {
        self.totals.get(category).copied()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Iterates over `(category, total)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.totals
            .iter()
            .map(|(category, total)| (category.as_str(), *total))
    }

    /// Iterates over the category names in first-seen order.
    pub fn categories(&self) -> impl Iterator<Item = &str> + '_ {
        self.totals.keys().map(String::as_str)
    }
}

/// Sums prices per category in a single pass over `products`.
pub fn group_by_category(products: &[ProductRecord]) -> CategoryTotals {
    let mut totals = IndexMap::new();
    for product in products {
        match totals.entry(product.category.clone()) {
            Entry::Occupied(mut entry) => *entry.get_mut() += product.price,
            Entry::Vacant(entry) => {
                entry.insert(product.price);
            }
        }
    }
    CategoryTotals { totals }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_prices_in_first_seen_order() {
        let products = vec![
            ProductRecord::new(1, "a", "A", 10.0),
            ProductRecord::new(2, "b", "B", 5.0),
            ProductRecord::new(3, "c", "A", 3.0),
        ];

        let totals = group_by_category(&products);
        assert_eq!(totals.categories().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(totals.get("A"), Some(13.0));
        assert_eq!(totals.get("B"), Some(5.0));
    }

    #[test]
    fn empty_input_yields_empty_totals() {
        let totals = group_by_category(&[]);
        assert!(totals.is_empty());
        assert_eq!(totals.iter().count(), 0);
    }

    #[test]
    fn keys_match_distinct_categories() {
        let categories = ["beauty", "fragrances", "beauty", "furniture", "groceries", "furniture"];
        let products: Vec<_> = categories
            .iter()
            .enumerate()
            .map(|(index, category)| {
                ProductRecord::new(index as u64, "item", *category, (index + 1) as f64 * 1.25)
            })
            .collect();

        let totals = group_by_category(&products);
        assert_eq!(
            totals.categories().collect::<Vec<_>>(),
            vec!["beauty", "fragrances", "furniture", "groceries"]
        );

        for (category, total) in totals.iter() {
            let expected: f64 = products
                .iter()
                .filter(|product| product.category == category)
                .map(|product| product.price)
                .sum();
            assert_eq!(total, expected, "total for {category}");
        }
    }

    #[test]
    fn missing_category_is_grouped_under_empty_name() {
        let products = vec![
            ProductRecord::new(1, "a", "", 2.0),
            ProductRecord::new(2, "b", "", 4.5),
        ];
        let totals = group_by_category(&products);
        assert_eq!(totals.len(), 1);
        assert_eq!(totals.get(""), Some(6.5));
    }
}
