//! Keyword lexicon for the lexical classifier
//!
//! All keyword matching is data-driven: greeting words, attribute
//! vocabularies, category synonyms and intent keywords live here rather
//! than in the classifier code. Defaults are compiled in; a YAML file
//! can replace them wholesale.
//!
//! Ordering matters in two places and is part of the contract:
//! - the first category whose synonym matches wins;
//! - the first attribute word found in an utterance is the extracted
//!   signal (lexicon order is the tie-break).

use serde::{Deserialize, Serialize};
use std::path::Path;

use shopchat_core::Category;

use crate::ConfigError;

/// Synonyms mapping to one catalog category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySynonyms {
    pub category: Category,
    pub synonyms: Vec<String>,
}

/// The full keyword lexicon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lexicon {
    /// Greeting vocabulary, matched as whole words
    #[serde(default = "default_greetings")]
    pub greetings: Vec<String>,

    /// Ordered category synonym lists; first match wins
    #[serde(default = "default_category_synonyms")]
    pub categories: Vec<CategorySynonyms>,

    #[serde(default = "default_colors")]
    pub colors: Vec<String>,

    #[serde(default = "default_designs")]
    pub designs: Vec<String>,

    #[serde(default = "default_styles")]
    pub styles: Vec<String>,

    #[serde(default = "default_materials")]
    pub materials: Vec<String>,

    /// Any of these marks order intent (substring match)
    #[serde(default = "default_order_keywords")]
    pub order_keywords: Vec<String>,

    /// Any of these marks FAQ intent (substring match, punctuation stripped)
    #[serde(default = "default_faq_keywords")]
    pub faq_keywords: Vec<String>,
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn default_greetings() -> Vec<String> {
    owned(&[
        "hi",
        "hello",
        "hey",
        "namaste",
        "greetings",
        "good morning",
        "good afternoon",
        "good evening",
    ])
}

fn default_category_synonyms() -> Vec<CategorySynonyms> {
    vec![
        CategorySynonyms {
            category: Category::Tees,
            synonyms: owned(&["tees", "tee", "tshirt", "t-shirt", "t-shirts"]),
        },
        CategorySynonyms {
            category: Category::Shirts,
            synonyms: owned(&["shirts", "shirt"]),
        },
        CategorySynonyms {
            category: Category::Pants,
            synonyms: owned(&["pants", "pant"]),
        },
        CategorySynonyms {
            category: Category::Jeans,
            synonyms: owned(&["jeans", "jean"]),
        },
    ]
}

fn default_colors() -> Vec<String> {
    owned(&[
        "black", "white", "blue", "navy", "red", "green", "grey", "gray", "beige", "brown",
        "olive", "maroon", "yellow", "pink",
    ])
}

fn default_designs() -> Vec<String> {
    owned(&["plain", "printed", "striped", "checked", "graphic", "solid", "floral"])
}

fn default_styles() -> Vec<String> {
    owned(&[
        "casual", "formal", "slim", "regular", "relaxed", "oversized", "skinny", "straight",
    ])
}

fn default_materials() -> Vec<String> {
    owned(&["cotton", "denim", "linen", "polyester", "wool", "rayon"])
}

fn default_order_keywords() -> Vec<String> {
    owned(&[
        "order", "orders", "delivery", "delivered", "shipping", "shipment", "track", "tracking",
        "dispatch",
    ])
}

fn default_faq_keywords() -> Vec<String> {
    owned(&[
        "return", "returns", "refund", "exchange", "cancel", "policy", "policies", "payment",
        "warranty", "cod", "replacement",
    ])
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            greetings: default_greetings(),
            categories: default_category_synonyms(),
            colors: default_colors(),
            designs: default_designs(),
            styles: default_styles(),
            materials: default_materials(),
            order_keywords: default_order_keywords(),
            faq_keywords: default_faq_keywords(),
        }
    }
}

impl Lexicon {
    /// Load from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileNotFound(format!("{}: {}", path.as_ref().display(), e)))?;

        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Load from the configured path, falling back to defaults
    pub fn load_or_default(path: Option<&str>) -> Self {
        match path {
            Some(p) => match Self::load(p) {
                Ok(lexicon) => lexicon,
                Err(e) => {
                    tracing::warn!("Failed to load lexicon from {}: {}. Using defaults.", p, e);
                    Self::default()
                }
            },
            None => Self::default(),
        }
    }
}
