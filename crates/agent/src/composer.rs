//! Response Composer
//!
//! Turns one classified utterance into exactly one bot message. Two
//! strategies: local-first (greeting template, local filter, LLM only
//! for order/FAQ questions) and full delegation (every non-greeting
//! message goes to the LLM). Strategies never surface errors to the
//! caller; any failure becomes the apology message and a log line.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use shopchat_catalog::CatalogStore;
use shopchat_config::{ComposerConfig, DelegationFormat, Lexicon, StrategyKind};
use shopchat_core::{ChatMessage, Product};
use shopchat_llm::{CompletionGateway, PromptBuilder, PromptMode, PRODUCTS_MARKER};

use crate::classifier::{Classification, Classifier};
use crate::filter::{FilterEngine, FilterOutcome};
use crate::AgentError;

const GREETING_REPLY: &str =
    "Hello! 👋 How can I help you today? You can ask me about products, sizes, orders, or policies.";

const APOLOGY_REPLY: &str =
    "Sorry, I'm having trouble understanding right now. Can you please rephrase?";

const HELP_REPLY: &str = "I can help you with:\n\
     • Finding products (try \"black tees under 2000\")\n\
     • Order and delivery status\n\
     • Returns, refunds and store policies";

const NO_CRITERIA_MATCH_REPLY: &str = "Sorry, no products found matching your criteria.";

/// Composes one bot reply per user utterance
///
/// Implementations are infallible from the caller's perspective: every
/// failure path collapses into an apology reply.
#[async_trait]
pub trait ResponseStrategy: Send + Sync {
    async fn respond(&self, utterance: &str) -> ChatMessage;
}

/// Build the configured strategy
pub fn build_strategy(
    composer: &ComposerConfig,
    lexicon: Lexicon,
    catalog: Arc<CatalogStore>,
    gateway: Arc<dyn CompletionGateway>,
) -> Result<Arc<dyn ResponseStrategy>, AgentError> {
    let prompts = PromptBuilder::new(
        catalog
            .serialize_for_prompt()
            .map_err(|e| AgentError::Catalog(e.to_string()))?,
    );
    let classifier = Classifier::new(lexicon);

    Ok(match composer.strategy {
        StrategyKind::LocalFirst => Arc::new(LocalFirstStrategy {
            classifier,
            catalog,
            gateway,
            prompts,
        }),
        StrategyKind::Delegate => Arc::new(DelegateStrategy {
            classifier,
            gateway,
            prompts,
            format: composer.delegation_format,
        }),
    })
}

/// Greeting template, local catalog filter, LLM only for order/FAQ
pub struct LocalFirstStrategy {
    classifier: Classifier,
    catalog: Arc<CatalogStore>,
    gateway: Arc<dyn CompletionGateway>,
    prompts: PromptBuilder,
}

#[async_trait]
impl ResponseStrategy for LocalFirstStrategy {
    async fn respond(&self, utterance: &str) -> ChatMessage {
        let classification = self.classifier.classify(utterance);

        if classification.is_greeting {
            return ChatMessage::bot(GREETING_REPLY);
        }

        if classification.is_order_query || classification.is_faq_query {
            return self.delegate_answer(utterance).await;
        }

        if classification.signals.any() {
            return self.filter_reply(&classification);
        }

        ChatMessage::bot(HELP_REPLY)
    }
}

impl LocalFirstStrategy {
    /// One gateway call in answer mode; failure becomes the apology
    async fn delegate_answer(&self, utterance: &str) -> ChatMessage {
        let prompt = self.prompts.build(utterance, PromptMode::Answer);
        match self.gateway.complete(&prompt).await {
            Ok(text) => ChatMessage::bot(text.trim()),
            Err(error) => {
                tracing::warn!(%error, utterance, "Completion failed, sending apology");
                ChatMessage::bot(APOLOGY_REPLY)
            }
        }
    }

    fn filter_reply(&self, classification: &Classification) -> ChatMessage {
        match FilterEngine::run(self.catalog.products(), &classification.signals) {
            // Exact matches render as product cards alone, no text
            FilterOutcome::Exact(products) => ChatMessage::bot_with_products("", products),
            FilterOutcome::Relaxed { category, products } => ChatMessage::bot_with_products(
                format!(
                    "Required product is not available, but you can see similar {}:",
                    category
                ),
                products,
            ),
            FilterOutcome::Empty => match classification.signals.category {
                Some(category) => ChatMessage::bot(format!("Sorry, no {} found.", category)),
                None => ChatMessage::bot(NO_CRITERIA_MATCH_REPLY),
            },
        }
    }
}

/// Every non-greeting utterance goes to the LLM
pub struct DelegateStrategy {
    classifier: Classifier,
    gateway: Arc<dyn CompletionGateway>,
    prompts: PromptBuilder,
    format: DelegationFormat,
}

/// Strict reply shape requested in envelope mode
#[derive(Debug, Deserialize)]
struct ReplyEnvelope {
    text: String,
    #[serde(default)]
    products: Vec<Product>,
}

#[async_trait]
impl ResponseStrategy for DelegateStrategy {
    async fn respond(&self, utterance: &str) -> ChatMessage {
        if self.classifier.classify(utterance).is_greeting {
            return ChatMessage::bot(GREETING_REPLY);
        }

        let mode = match self.format {
            DelegationFormat::Envelope => PromptMode::DelegateEnvelope,
            DelegationFormat::Marker => PromptMode::DelegateMarker,
        };

        let prompt = self.prompts.build(utterance, mode);
        let completion = match self.gateway.complete(&prompt).await {
            Ok(completion) => completion,
            Err(error) => {
                tracing::warn!(%error, utterance, "Completion failed, sending apology");
                return ChatMessage::bot(APOLOGY_REPLY);
            }
        };

        match self.format {
            DelegationFormat::Envelope => parse_envelope(&completion),
            DelegationFormat::Marker => parse_marker(&completion),
        }
    }
}

/// Parse the strict {"text", "products"} envelope
///
/// Code fences are stripped first; a completion that still fails to
/// parse is degraded to a plain-text reply rather than dropped.
fn parse_envelope(completion: &str) -> ChatMessage {
    let body = strip_code_fences(completion);

    match serde_json::from_str::<ReplyEnvelope>(body) {
        Ok(envelope) => ChatMessage::bot_with_products(envelope.text, envelope.products),
        Err(error) => {
            tracing::warn!(%error, "Envelope parse failed, replying with raw text");
            ChatMessage::bot(completion.trim())
        }
    }
}

/// Parse the legacy [PRODUCTS] marker format
///
/// The reply text is the completion with the marker and the product
/// array removed; an unparseable array degrades to text-only.
fn parse_marker(completion: &str) -> ChatMessage {
    let Some(marker_pos) = completion.find(PRODUCTS_MARKER) else {
        return ChatMessage::bot(completion.trim());
    };

    if let Some((start, end)) = last_array_span(completion) {
        match serde_json::from_str::<Vec<Product>>(&completion[start..=end]) {
            Ok(products) => {
                let mut text = String::new();
                text.push_str(&completion[..marker_pos]);
                text.push_str(&completion[marker_pos + PRODUCTS_MARKER.len()..start.max(marker_pos + PRODUCTS_MARKER.len())]);
                text.push_str(&completion[(end + 1).max(marker_pos + PRODUCTS_MARKER.len())..]);
                return ChatMessage::bot_with_products(text.trim(), products);
            }
            Err(error) => {
                tracing::warn!(%error, "Product array parse failed, replying text-only");
            }
        }
    }

    let text = completion.replacen(PRODUCTS_MARKER, "", 1);
    ChatMessage::bot(text.trim())
}

/// Byte span of the last balanced top-level `[...]` in the text,
/// skipping the literal marker itself
fn last_array_span(text: &str) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    let end = text.rfind(']')?;

    let mut depth = 0usize;
    for i in (0..=end).rev() {
        match bytes[i] {
            b']' => depth += 1,
            b'[' => {
                depth -= 1;
                if depth == 0 {
                    // The marker is itself bracketed; skip it
                    if text[i..].starts_with(PRODUCTS_MARKER) && end == i + PRODUCTS_MARKER.len() - 1
                    {
                        return None;
                    }
                    return Some((i, end));
                }
            }
            _ => {}
        }
    }
    None
}

/// Strip a leading/trailing markdown code fence if present
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the fence line
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.trim_start_matches(['\r', '\n'])
        .strip_suffix("```")
        .map(str::trim)
        .unwrap_or(trimmed)
}
