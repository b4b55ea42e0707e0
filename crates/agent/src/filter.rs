//! Local Filter Engine
//!
//! ANDs every present signal over the catalog's product order. When the
//! exact set is empty but a category was requested, falls back to the
//! category-only relaxed set so the composer can offer "similar"
//! products instead of nothing.

use shopchat_core::{Category, Product, LABEL_SIZES};

use crate::classifier::FilterSignals;

/// Outcome of one filter run
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    /// Products satisfying every present signal
    Exact(Vec<Product>),
    /// Category-only fallback; other signals were dropped
    Relaxed {
        category: Category,
        products: Vec<Product>,
    },
    /// Nothing matched, even relaxed
    Empty,
}

/// Stateless filter over the catalog's product collection
pub struct FilterEngine;

impl FilterEngine {
    /// Run the signals against the products, preserving catalog order
    pub fn run(products: &[Product], signals: &FilterSignals) -> FilterOutcome {
        let exact: Vec<Product> = products
            .iter()
            .filter(|p| Self::matches(p, signals))
            .cloned()
            .collect();

        if !exact.is_empty() {
            return FilterOutcome::Exact(exact);
        }

        // Relaxation is category-only: the relaxed set is exactly the
        // products of the requested category, independent of the other
        // signals.
        if let Some(category) = signals.category {
            let relaxed: Vec<Product> = products
                .iter()
                .filter(|p| p.category == category)
                .cloned()
                .collect();

            if !relaxed.is_empty() {
                return FilterOutcome::Relaxed {
                    category,
                    products: relaxed,
                };
            }
        }

        FilterOutcome::Empty
    }

    /// True iff every present signal matches this product
    fn matches(product: &Product, signals: &FilterSignals) -> bool {
        if let Some(category) = signals.category {
            if product.category != category {
                return false;
            }
        }

        let contains = |field: &str, value: &Option<String>| match value {
            Some(v) => field.to_lowercase().contains(&v.to_lowercase()),
            None => true,
        };

        if !contains(&product.color, &signals.color)
            || !contains(&product.design, &signals.design)
            || !contains(&product.style, &signals.style)
            || !contains(&product.material, &signals.material)
        {
            return false;
        }

        if let Some(size) = &signals.size {
            if !Self::variant_size_matches(product, size) {
                return false;
            }
        }

        if let Some(max_price) = signals.max_price {
            if product.price > max_price {
                return false;
            }
        }

        true
    }

    /// Category-aware variant size comparison
    ///
    /// Label equality for tees/shirts, numeric equality for jeans/pants,
    /// plain string equality otherwise (and when the requested token
    /// does not fit the category's convention).
    fn variant_size_matches(product: &Product, requested: &str) -> bool {
        let requested = requested.trim().to_ascii_uppercase();
        let is_label = LABEL_SIZES.contains(&requested.as_str());
        let requested_numeric: Option<u32> = requested.parse().ok();

        product.variants.iter().any(|variant| {
            let variant_size = variant.size.trim().to_ascii_uppercase();

            if product.category.uses_label_sizes() && is_label {
                return variant_size == requested;
            }
            if product.category.uses_numeric_sizes() {
                if let (Some(req), Ok(var)) = (requested_numeric, variant_size.parse::<u32>()) {
                    return var == req;
                }
            }
            variant_size == requested
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopchat_core::Variant;

    fn product(id: &str, category: Category, color: &str, price: u32, sizes: &[&str]) -> Product {
        Product {
            id: id.to_string(),
            name: format!("{} {}", color, category),
            description: "test".to_string(),
            price,
            category,
            color: color.to_string(),
            design: "plain".to_string(),
            material: "cotton".to_string(),
            style: "casual".to_string(),
            rating: 4.0,
            reviews: 10,
            in_stock: true,
            sizes: sizes.join("-"),
            variants: sizes
                .iter()
                .enumerate()
                .map(|(i, size)| Variant {
                    id: format!("{}-{}", id, i),
                    size: size.to_string(),
                    price,
                    in_stock: true,
                })
                .collect(),
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("t1", Category::Tees, "black", 1800, &["S", "M", "L"]),
            product("t2", Category::Tees, "white", 1900, &["M", "XL"]),
            product("j1", Category::Jeans, "blue", 2500, &["30", "32", "34"]),
            product("s1", Category::Shirts, "navy", 2200, &["M", "L"]),
        ]
    }

    fn signals() -> FilterSignals {
        FilterSignals::default()
    }

    #[test]
    fn test_every_result_satisfies_every_signal() {
        let products = catalog();
        let sig = FilterSignals {
            category: Some(Category::Tees),
            max_price: Some(2000),
            ..signals()
        };

        match FilterEngine::run(&products, &sig) {
            FilterOutcome::Exact(matches) => {
                assert_eq!(matches.len(), 2);
                assert!(matches
                    .iter()
                    .all(|p| p.category == Category::Tees && p.price <= 2000));
            }
            other => panic!("expected exact matches, got {:?}", other),
        }
    }

    #[test]
    fn test_black_tee_under_2000() {
        let products = catalog();
        let sig = FilterSignals {
            category: Some(Category::Tees),
            color: Some("black".to_string()),
            max_price: Some(2000),
            ..signals()
        };

        match FilterEngine::run(&products, &sig) {
            FilterOutcome::Exact(matches) => {
                assert_eq!(matches.len(), 1);
                assert_eq!(matches[0].id, "t1");
            }
            other => panic!("expected exact matches, got {:?}", other),
        }
    }

    #[test]
    fn test_size_matching_is_category_aware() {
        let products = catalog();

        // Jeans match numeric size 32 but not a label size
        let jeans_32 = FilterSignals {
            category: Some(Category::Jeans),
            size: Some("32".to_string()),
            ..signals()
        };
        assert!(matches!(
            FilterEngine::run(&products, &jeans_32),
            FilterOutcome::Exact(_)
        ));

        let jeans_xl = FilterSignals {
            category: Some(Category::Jeans),
            size: Some("XL".to_string()),
            ..signals()
        };
        assert!(matches!(
            FilterEngine::run(&products, &jeans_xl),
            FilterOutcome::Relaxed { .. }
        ));

        // Tees match label sizes case-insensitively, not numerics
        let tees_m = FilterSignals {
            category: Some(Category::Tees),
            size: Some("m".to_string()),
            ..signals()
        };
        assert!(matches!(
            FilterEngine::run(&products, &tees_m),
            FilterOutcome::Exact(_)
        ));

        let tees_32 = FilterSignals {
            category: Some(Category::Tees),
            size: Some("32".to_string()),
            ..signals()
        };
        assert!(matches!(
            FilterEngine::run(&products, &tees_32),
            FilterOutcome::Relaxed { .. }
        ));
    }

    #[test]
    fn test_relaxed_set_is_category_only() {
        let products = catalog();
        // No red tees exist; relaxation drops the color and returns all tees
        let sig = FilterSignals {
            category: Some(Category::Tees),
            color: Some("red".to_string()),
            ..signals()
        };

        match FilterEngine::run(&products, &sig) {
            FilterOutcome::Relaxed { category, products } => {
                assert_eq!(category, Category::Tees);
                assert_eq!(products.len(), 2);
                assert!(products.iter().all(|p| p.category == Category::Tees));
            }
            other => panic!("expected relaxed matches, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_when_category_absent_and_nothing_matches() {
        let products = catalog();
        let sig = FilterSignals {
            color: Some("purple".to_string()),
            ..signals()
        };
        assert_eq!(FilterEngine::run(&products, &sig), FilterOutcome::Empty);
    }

    #[test]
    fn test_empty_when_category_has_no_products() {
        let products = vec![product("t1", Category::Tees, "black", 1800, &["M"])];
        let sig = FilterSignals {
            category: Some(Category::Pants),
            ..signals()
        };
        assert_eq!(FilterEngine::run(&products, &sig), FilterOutcome::Empty);
    }

    #[test]
    fn test_output_preserves_catalog_order() {
        let products = catalog();
        let sig = FilterSignals {
            category: Some(Category::Tees),
            ..signals()
        };
        match FilterEngine::run(&products, &sig) {
            FilterOutcome::Exact(matches) => {
                let ids: Vec<&str> = matches.iter().map(|p| p.id.as_str()).collect();
                assert_eq!(ids, vec!["t1", "t2"]);
            }
            other => panic!("expected exact matches, got {:?}", other),
        }
    }
}
