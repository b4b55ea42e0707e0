//! Catalog Store
//!
//! Three read-only collections (products, FAQs, shipping) loaded once at
//! startup from JSON files. Immutable for the process lifetime, so reads
//! need no synchronization; consumers share it behind an `Arc`.

use std::path::Path;

use thiserror::Error;

use shopchat_core::{FaqEntry, Product, ShippingRecord};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse {file}: {message}")]
    ParseError { file: String, message: String },

    #[error("Invalid catalog: {0}")]
    Invalid(String),
}

impl From<CatalogError> for shopchat_core::Error {
    fn from(err: CatalogError) -> Self {
        shopchat_core::Error::Catalog(err.to_string())
    }
}

/// The read-only catalog store
#[derive(Debug, Clone)]
pub struct CatalogStore {
    products: Vec<Product>,
    faqs: Vec<FaqEntry>,
    shipping: Vec<ShippingRecord>,
}

impl CatalogStore {
    /// Build a store from in-memory collections (tests, embedded data)
    pub fn new(
        products: Vec<Product>,
        faqs: Vec<FaqEntry>,
        shipping: Vec<ShippingRecord>,
    ) -> Result<Self, CatalogError> {
        for product in &products {
            if product.variants.is_empty() {
                return Err(CatalogError::Invalid(format!(
                    "Product {} has no variants",
                    product.id
                )));
            }
        }

        Ok(Self {
            products,
            faqs,
            shipping,
        })
    }

    /// Load products.json, faqs.json and shipping.json from a directory
    pub fn load_from_dir<P: AsRef<Path>>(data_dir: P) -> Result<Self, CatalogError> {
        let dir = data_dir.as_ref();

        let products: Vec<Product> = load_json(&dir.join("products.json"))?;
        let faqs: Vec<FaqEntry> = load_json(&dir.join("faqs.json"))?;
        let shipping: Vec<ShippingRecord> = load_json(&dir.join("shipping.json"))?;

        tracing::info!(
            products = products.len(),
            faqs = faqs.len(),
            shipping = shipping.len(),
            "Catalog loaded"
        );

        Self::new(products, faqs, shipping)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn faqs(&self) -> &[FaqEntry] {
        &self.faqs
    }

    pub fn shipping(&self) -> &[ShippingRecord] {
        &self.shipping
    }

    /// Look up a product by identifier
    ///
    /// "Not found" is a first-class displayable state for callers, not
    /// an error.
    pub fn product_by_id(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Serialize the full catalog for embedding into an LLM prompt
    pub fn serialize_for_prompt(&self) -> Result<CatalogSnapshot, CatalogError> {
        let encode = |name: &str, value: serde_json::Result<String>| {
            value.map_err(|e| CatalogError::ParseError {
                file: name.to_string(),
                message: e.to_string(),
            })
        };

        Ok(CatalogSnapshot {
            products_json: encode("products", serde_json::to_string(&self.products))?,
            faqs_json: encode("faqs", serde_json::to_string(&self.faqs))?,
            shipping_json: encode("shipping", serde_json::to_string(&self.shipping))?,
        })
    }
}

/// JSON-serialized catalog collections, ready for prompt embedding
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub products_json: String,
    pub faqs_json: String,
    pub shipping_json: String,
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CatalogError::FileNotFound(format!("{}: {}", path.display(), e)))?;

    serde_json::from_str(&content).map_err(|e| CatalogError::ParseError {
        file: path.display().to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopchat_core::{Category, Variant};

    fn tee(id: &str, color: &str, price: u32) -> Product {
        Product {
            id: id.to_string(),
            name: format!("{} tee", color),
            description: "Test tee".to_string(),
            price,
            category: Category::Tees,
            color: color.to_string(),
            design: "plain".to_string(),
            material: "cotton".to_string(),
            style: "casual".to_string(),
            rating: 4.0,
            reviews: 10,
            in_stock: true,
            sizes: "S-XL".to_string(),
            variants: vec![Variant {
                id: format!("{}-m", id),
                size: "M".to_string(),
                price,
                in_stock: true,
            }],
        }
    }

    #[test]
    fn test_product_lookup() {
        let store = CatalogStore::new(vec![tee("p1", "black", 1800)], vec![], vec![]).unwrap();
        assert!(store.product_by_id("p1").is_some());
        assert!(store.product_by_id("missing").is_none());
    }

    #[test]
    fn test_rejects_product_without_variants() {
        let mut product = tee("p1", "black", 1800);
        product.variants.clear();
        assert!(CatalogStore::new(vec![product], vec![], vec![]).is_err());
    }

    #[test]
    fn test_snapshot_contains_all_collections() {
        let store = CatalogStore::new(
            vec![tee("p1", "black", 1800)],
            vec![FaqEntry {
                question: "What is the return policy?".to_string(),
                answer: "30 days".to_string(),
                keywords: vec!["return".to_string()],
            }],
            vec![ShippingRecord {
                order_id: "ORD-1".to_string(),
                status: "in transit".to_string(),
                carrier: None,
                cost: Some(99),
                estimated_delivery: None,
            }],
        )
        .unwrap();

        let snapshot = store.serialize_for_prompt().unwrap();
        assert!(snapshot.products_json.contains("\"p1\""));
        assert!(snapshot.faqs_json.contains("return policy"));
        assert!(snapshot.shipping_json.contains("ORD-1"));
    }
}
