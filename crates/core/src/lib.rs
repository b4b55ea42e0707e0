//! Core types for the shopchat assistant
//!
//! This crate provides the foundational types used across all other crates:
//! - Catalog records (products, variants, FAQs, shipping)
//! - Chat transcript types
//! - The shared error type

pub mod chat;
pub mod error;
pub mod product;

pub use chat::{ChatMessage, Sender, TranscriptStats};
pub use error::{Error, Result};
pub use product::{Category, FaqEntry, Product, ShippingRecord, Variant, LABEL_SIZES};
