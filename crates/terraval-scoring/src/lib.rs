//! Terraval Scoring - the deterministic feature-to-price model
//!
//! Every calculator agent owns one [`ScoringProfile`] and runs the same
//! tiered multiplicative model over it:
//!
//! 1. vegetation tier -> base unit price
//! 2. area tier -> size multiplier (never rewards larger parcels)
//! 3. document count -> documentation multiplier (saturates at 1.0)
//! 4. `valuation = floor(area * price * area_mult * doc_mult)`
//! 5. confidence = base minus independent penalties, clamped
//!
//! Scoring is pure and total: a validated [`FeatureRecord`] always scores.
//!
//! [`FeatureRecord`]: terraval_types::FeatureRecord

pub mod profile;
pub mod scorer;

pub use profile::*;
pub use scorer::*;
