//! Lexical Classifier
//!
//! Pure keyword/regex classification of one raw utterance into filter
//! signals and intent flags. No external calls, no state: the same
//! utterance always yields the same classification.

use once_cell::sync::Lazy;
use regex::Regex;

use shopchat_config::Lexicon;
use shopchat_core::Category;

/// A standalone label size or 2-3 digit numeric size token
static SIZE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(XS|S|M|L|XL|XXL|XXXL|\d{2,3})\b").unwrap());

/// "under 2000" / "below 2000" / "less than 2000" / "products under 2000"
static MAX_PRICE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(under|below|less\s+than|products\s+under)\s+(\d+)").unwrap());

/// Everything except word characters and whitespace
static PUNCTUATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

/// Attribute filters extracted from one utterance
///
/// Constructed fresh per message and discarded after composing the
/// response; never merged across turns. Absence of a signal is the
/// normal case, not an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSignals {
    pub category: Option<Category>,
    pub color: Option<String>,
    pub design: Option<String>,
    pub style: Option<String>,
    pub material: Option<String>,
    /// Requested size token, uppercased ("M", "32")
    pub size: Option<String>,
    pub max_price: Option<u32>,
}

impl FilterSignals {
    /// True if at least one signal is present
    pub fn any(&self) -> bool {
        self.category.is_some()
            || self.color.is_some()
            || self.design.is_some()
            || self.style.is_some()
            || self.material.is_some()
            || self.size.is_some()
            || self.max_price.is_some()
    }
}

/// Result of classifying one utterance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub signals: FilterSignals,
    pub is_greeting: bool,
    pub is_order_query: bool,
    pub is_faq_query: bool,
}

/// Lexicon-driven utterance classifier
///
/// Greeting regexes are compiled once at construction; everything else
/// is substring matching over the lowercased utterance.
pub struct Classifier {
    lexicon: Lexicon,
    greeting_res: Vec<Regex>,
}

impl Classifier {
    pub fn new(lexicon: Lexicon) -> Self {
        let greeting_res = lexicon
            .greetings
            .iter()
            .map(|greet| {
                // Whole-word match; greetings may be multi-word phrases
                Regex::new(&format!(r"(?i)\b{}\b", regex::escape(greet)))
                    .expect("greeting pattern is escaped and always valid")
            })
            .collect();

        Self {
            lexicon,
            greeting_res,
        }
    }

    /// Classify one utterance
    pub fn classify(&self, utterance: &str) -> Classification {
        let lower = utterance.to_lowercase();

        let is_greeting = self.greeting_res.iter().any(|re| re.is_match(&lower));

        let signals = FilterSignals {
            category: self.map_category(&lower),
            color: first_contained(&self.lexicon.colors, &lower),
            design: first_contained(&self.lexicon.designs, &lower),
            style: first_contained(&self.lexicon.styles, &lower),
            material: first_contained(&self.lexicon.materials, &lower),
            size: SIZE_RE
                .captures(&lower)
                .map(|c| c[1].to_ascii_uppercase()),
            max_price: MAX_PRICE_RE
                .captures(&lower)
                .and_then(|c| c[2].parse().ok()),
        };

        let is_order_query = self
            .lexicon
            .order_keywords
            .iter()
            .any(|kw| lower.contains(kw.as_str()));

        // FAQ keywords are checked against the punctuation-stripped text
        // so "returns?" still matches "returns".
        let stripped = PUNCTUATION_RE.replace_all(&lower, "");
        let is_faq_query = self
            .lexicon
            .faq_keywords
            .iter()
            .any(|kw| stripped.contains(kw.to_lowercase().as_str()));

        Classification {
            signals,
            is_greeting,
            is_order_query,
            is_faq_query,
        }
    }

    /// First category whose synonym list matches wins
    fn map_category(&self, lower: &str) -> Option<Category> {
        self.lexicon
            .categories
            .iter()
            .find(|entry| entry.synonyms.iter().any(|s| lower.contains(s.as_str())))
            .map(|entry| entry.category)
    }
}

/// First vocabulary entry contained in the text; list order is the tie-break
fn first_contained(words: &[String], lower: &str) -> Option<String> {
    words
        .iter()
        .find(|w| lower.contains(w.as_str()))
        .cloned()
}
