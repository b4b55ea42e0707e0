//! Prompt construction
//!
//! Builds the single user-role prompt embedding the full serialized
//! catalog plus a fixed instruction block. The catalog snapshot is
//! serialized once at construction and reused for every call; the
//! catalog is immutable for the process lifetime so this changes no
//! behavior.

use shopchat_catalog::CatalogSnapshot;

/// Literal marker the model prefixes product answers with in marker mode
pub const PRODUCTS_MARKER: &str = "[PRODUCTS]";

/// Which instruction block the prompt carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// Plain answer from supplied data (order/FAQ queries)
    Answer,
    /// Full delegation; reply as one JSON envelope {"text", "products"}
    DelegateEnvelope,
    /// Full delegation; legacy [PRODUCTS] marker plus embedded JSON array
    DelegateMarker,
}

/// Builds one-shot prompts around a fixed catalog snapshot
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    snapshot: CatalogSnapshot,
}

impl PromptBuilder {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        Self { snapshot }
    }

    /// Build the prompt for one utterance
    pub fn build(&self, utterance: &str, mode: PromptMode) -> String {
        let mut prompt = format!(
            "You are an ecommerce chatbot. Answer this question: \"{utterance}\" using ONLY \
             the provided data below. DO NOT search the web or use external information. \
             DO NOT add any citations or references.\n\n\
             Available data:\n\
             - Products: {products}\n\
             - FAQs: {faqs}\n\
             - Shipping: {shipping}\n\n",
            utterance = utterance,
            products = self.snapshot.products_json,
            faqs = self.snapshot.faqs_json,
            shipping = self.snapshot.shipping_json,
        );

        prompt.push_str(match mode {
            PromptMode::Answer => {
                "Instructions:\n\
                 1. Answer naturally and helpfully using ONLY the provided data\n\
                 2. If the user asks about shipping/orders, format the response nicely \
                 (bullet points, grouped by status)\n\
                 3. Handle return/cancel/policy questions strictly from the FAQ data\n\
                 4. If no relevant data exists, say you don't have that information\n\
                 5. Always be friendly and professional\n"
            }
            PromptMode::DelegateEnvelope => {
                "Instructions:\n\
                 1. Answer naturally and helpfully using ONLY the provided data\n\
                 2. Reply with EXACTLY ONE JSON object and nothing else, in the form \
                 {\"text\": \"<your answer>\", \"products\": [<product objects>]}\n\
                 3. Each product object must use the fields id, name, description, price, \
                 category, color, design, material, style, rating, reviews, in_stock, sizes, \
                 variants exactly as they appear in the provided product data\n\
                 4. When the question concerns products and no exact match exists, fill \
                 \"products\" with related products from the closest category instead of \
                 an empty array\n\
                 5. For non-product questions, use an empty \"products\" array\n"
            }
            PromptMode::DelegateMarker => {
                "Instructions:\n\
                 1. Answer naturally and helpfully using ONLY the provided data\n\
                 2. When the question concerns products, prefix your answer with the literal \
                 marker [PRODUCTS] and include EXACTLY ONE JSON array of product objects, \
                 using the fields id, name, description, price, category, color, design, \
                 material, style, rating, reviews, in_stock, sizes, variants exactly as they \
                 appear in the provided product data\n\
                 3. When no exact match exists, fill the array with related products from \
                 the closest category instead of leaving it empty\n\
                 4. For non-product questions, omit the marker and the array\n"
            }
        });

        prompt.push_str("\nQuestion: ");
        prompt.push_str(utterance);
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> CatalogSnapshot {
        CatalogSnapshot {
            products_json: r#"[{"id":"p1"}]"#.to_string(),
            faqs_json: r#"[{"question":"returns?"}]"#.to_string(),
            shipping_json: r#"[{"order_id":"ORD-1"}]"#.to_string(),
        }
    }

    #[test]
    fn test_prompt_embeds_catalog_and_utterance() {
        let builder = PromptBuilder::new(snapshot());
        let prompt = builder.build("where is my order", PromptMode::Answer);

        assert!(prompt.contains(r#"[{"id":"p1"}]"#));
        assert!(prompt.contains(r#"[{"question":"returns?"}]"#));
        assert!(prompt.contains(r#"[{"order_id":"ORD-1"}]"#));
        assert!(prompt.contains("where is my order"));
        assert!(prompt.contains("DO NOT search the web"));
    }

    #[test]
    fn test_marker_only_in_marker_mode() {
        let builder = PromptBuilder::new(snapshot());
        assert!(!builder
            .build("black tees", PromptMode::Answer)
            .contains(PRODUCTS_MARKER));
        assert!(!builder
            .build("black tees", PromptMode::DelegateEnvelope)
            .contains(PRODUCTS_MARKER));
        assert!(builder
            .build("black tees", PromptMode::DelegateMarker)
            .contains(PRODUCTS_MARKER));
    }

    #[test]
    fn test_envelope_mode_requests_json_object() {
        let builder = PromptBuilder::new(snapshot());
        let prompt = builder.build("black tees", PromptMode::DelegateEnvelope);
        assert!(prompt.contains(r#"{"text""#));
        assert!(prompt.contains("EXACTLY ONE JSON object"));
    }
}
