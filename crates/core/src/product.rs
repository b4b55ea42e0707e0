//! Catalog record types
//!
//! The catalog is loaded once at startup and read-only afterwards; these
//! types carry no behavior beyond category-dependent size conventions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label sizes used by tees and shirts, in ascending order
pub const LABEL_SIZES: &[&str] = &["XS", "S", "M", "L", "XL", "XXL", "XXXL"];

/// Closed set of product categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Tees,
    Shirts,
    Pants,
    Jeans,
}

impl Category {
    /// Canonical lowercase name, as stored in catalog data
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Tees => "tees",
            Category::Shirts => "shirts",
            Category::Pants => "pants",
            Category::Jeans => "jeans",
        }
    }

    /// Tees and shirts carry label sizes (XS..XXXL)
    pub fn uses_label_sizes(&self) -> bool {
        matches!(self, Category::Tees | Category::Shirts)
    }

    /// Jeans and pants carry numeric waist sizes
    pub fn uses_numeric_sizes(&self) -> bool {
        matches!(self, Category::Jeans | Category::Pants)
    }

    /// Parse a canonical category name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tees" => Some(Category::Tees),
            "shirts" => Some(Category::Shirts),
            "pants" => Some(Category::Pants),
            "jeans" => Some(Category::Jeans),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sellable size variant of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    /// Variant identifier, unique within the product
    pub id: String,
    /// Size token: a label (XS..XXXL) or a numeric waist size
    pub size: String,
    /// Variant price, minor currency units
    pub price: u32,
    /// Variant availability
    pub in_stock: bool,
}

/// A product record from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier
    pub id: String,
    pub name: String,
    pub description: String,
    /// Base price, minor currency units
    pub price: u32,
    pub category: Category,
    pub color: String,
    pub design: String,
    pub material: String,
    pub style: String,
    pub rating: f32,
    pub reviews: u32,
    pub in_stock: bool,
    /// Human-readable sizes descriptor (e.g. "S-XXL" or "30-38")
    pub sizes: String,
    /// Size variants; every product has at least one
    pub variants: Vec<Variant>,
}

/// An FAQ entry; topic keywords feed the classifier's FAQ-intent check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// A shipment record; treated opaquely and only serialized into LLM context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingRecord {
    pub order_id: String,
    pub status: String,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub cost: Option<u32>,
    #[serde(default)]
    pub estimated_delivery: Option<String>,
}
