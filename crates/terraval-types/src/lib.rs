//! Terraval Types - Canonical domain types for parcel valuation
//!
//! This crate contains the data contracts shared by every other terraval
//! crate, with zero dependencies on them:
//!
//! - [`FeatureRecord`]: the immutable remote-sensing summary every agent consumes
//! - [`FeatureInput`]: the lenient wire shape a record is parsed from
//! - [`ValuationResult`]: the self-contained answer an agent returns
//! - [`AgentError`]: the failure taxonomy mapped into error results
//!
//! # Invariants
//!
//! 1. A feature record is never partially filled; defaults are applied
//!    before construction, never by an agent
//! 2. A valuation result carries either the success fields or `error`,
//!    never both
//! 3. No agent failure crosses the agent boundary as anything other than
//!    an error result

pub mod error;
pub mod feature;
pub mod identity;
pub mod result;

pub use error::*;
pub use feature::*;
pub use identity::*;
pub use result::*;
