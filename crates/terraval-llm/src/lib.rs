//! Terraval LLM - Remote text-generation provider abstraction
//!
//! This crate provides a single interface over the hosted models the
//! valuation agents talk to:
//!
//! - Groq (OpenAI-compatible chat completions)
//! - Google Gemini (`generateContent`)
//! - Any other OpenAI-compatible endpoint (vLLM, llama.cpp, ...)
//!
//! ## Key Design Principles
//!
//! 1. Clients are constructed explicitly from a [`ProviderConfig`] and
//!    passed in; nothing reads the environment here
//! 2. A missing credential is a construction-time [`LLMError::ConfigurationError`]
//! 3. Every request carries a bounded timeout
//! 4. Outputs are opaque text; validating them is the caller's job

pub mod client;
pub mod providers;
pub mod types;

pub use client::*;
pub use providers::*;
pub use types::*;
