//! # naskah-augment
//!
//! Generative augmentation layer for the naskah content layer.
//!
//! This crate provides:
//! - A Gemini REST backend implementing the shared generation trait
//! - The augmentation service: structured manuscript autofill,
//!   description generation, title-idea generation, summarization, and
//!   grounded search with citations
//! - Strict unwrapping and shape validation of model output
//! - Graceful degradation when no service credential is configured
//!
//! ## Example
//!
//! ```rust,ignore
//! use naskah_augment::{AugmentConfig, AugmentService};
//!
//! let service = AugmentService::new(AugmentConfig::from_env());
//! if service.is_available() {
//!     let autofill = service.autofill_manuscript("Babad Tanah Jawi").await?;
//!     println!("{:?}", autofill.category);
//! }
//! ```

pub mod gemini;
pub mod mock;
pub mod service;

pub use gemini::{GeminiBackend, DEFAULT_GEMINI_URL, DEFAULT_GEN_MODEL, GEN_TIMEOUT_SECS};
pub use mock::{MockCall, MockGenerationBackend};
pub use service::{
    AugmentConfig, AugmentService, AUTOFILL_TEMPERATURE, DESCRIPTION_TEMPERATURE,
    IDEAS_TEMPERATURE, SUMMARY_TEMPERATURE,
};
