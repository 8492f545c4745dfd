//! Terraval Agents - independent valuation opinions and their orchestration
//!
//! - [`Agent`]: a closed set of shapes (calculator, remote, unimplemented,
//!   misconfigured) behind one `run(&FeatureRecord) -> ValuationResult`
//! - [`Narrator`]: grounded explanations with a deterministic fallback, or
//!   ungrounded remote proposals validated by the guard
//! - [`Orchestrator`]: concurrent fan-out with per-agent timeouts
//! - [`calculate_consensus`]: confidence-weighted aggregation of the
//!   successful subset
//!
//! # Key Principle
//!
//! **One agent's failure never corrupts another agent's result.**
//!
//! [`FeatureRecord`]: terraval_types::FeatureRecord

pub mod agent;
pub mod consensus;
pub mod narrative;
pub mod orchestrator;
pub mod prompts;
pub mod settings;

pub use agent::*;
pub use consensus::*;
pub use narrative::*;
pub use orchestrator::*;
pub use settings::*;
