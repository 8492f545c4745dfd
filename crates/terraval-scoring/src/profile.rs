//! Scoring profiles - named coefficient tables for the tiered model
//!
//! Two calibrations exist and neither is canonical, so both stay
//! selectable by name. Multipliers are held as integer per-mille values
//! so that sums like `0.70 + 2 * 0.15` land exactly on `1.0`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Multiplier denominator: 1000 per-mille == 1.0
pub const PERMILLE: u64 = 1000;

/// One vegetation tier: applies when `ndvi > ndvi_above`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTier {
    pub ndvi_above: f64,
    /// Currency units per square metre
    pub price: u64,
    pub label: String,
}

impl PriceTier {
    pub fn new(ndvi_above: f64, price: u64, label: impl Into<String>) -> Self {
        Self {
            ndvi_above,
            price,
            label: label.into(),
        }
    }
}

/// Size tiers; comparisons are strict less-than
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaTiers {
    pub small_below: f64,
    pub medium_below: f64,
    pub small_permille: u64,
    pub medium_permille: u64,
    pub large_permille: u64,
}

/// `min(1.0, base + count * per_document)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentationTerms {
    pub base_permille: u64,
    pub per_document_permille: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceTerms {
    pub base: u8,
    pub floor: u8,
    pub ceiling: u8,
    /// Penalised when `cloud_coverage > cloud_above`
    pub cloud_above: f64,
    pub cloud_penalty: u8,
    /// Penalised when `document_count < min_documents`
    pub min_documents: u32,
    pub documents_penalty: u8,
    /// Penalised when `ndvi < ndvi_below`
    pub ndvi_below: f64,
    pub ndvi_penalty: u8,
}

/// A complete, named set of coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringProfile {
    pub name: String,
    pub price_tiers: Vec<PriceTier>,
    /// Applies when no tier matches
    pub floor_tier: PriceTier,
    pub area: AreaTiers,
    pub documentation: DocumentationTerms,
    pub confidence: ConfidenceTerms,
}

impl ScoringProfile {
    /// Profile A
    pub fn standard() -> Self {
        Self {
            name: ProfileName::Standard.to_string(),
            price_tiers: vec![
                PriceTier::new(0.6, 2500, "strong"),
                PriceTier::new(0.4, 2200, "moderate"),
            ],
            floor_tier: PriceTier::new(f64::MIN, 1800, "fair"),
            area: AreaTiers {
                small_below: 500.0,
                medium_below: 1000.0,
                small_permille: 1000,
                medium_permille: 950,
                large_permille: 900,
            },
            documentation: DocumentationTerms {
                base_permille: 700,
                per_document_permille: 150,
            },
            confidence: ConfidenceTerms {
                base: 85,
                floor: 60,
                ceiling: 95,
                cloud_above: 10.0,
                cloud_penalty: 5,
                min_documents: 2,
                documents_penalty: 10,
                ndvi_below: 0.3,
                ndvi_penalty: 5,
            },
        }
    }

    /// Profile B
    pub fn conservative() -> Self {
        Self {
            name: ProfileName::Conservative.to_string(),
            price_tiers: vec![
                PriceTier::new(0.65, 2700, "strong"),
                PriceTier::new(0.5, 2400, "moderate"),
                PriceTier::new(0.3, 2000, "fair"),
            ],
            floor_tier: PriceTier::new(f64::MIN, 1700, "poor"),
            area: AreaTiers {
                small_below: 500.0,
                medium_below: 1000.0,
                small_permille: 1000,
                medium_permille: 930,
                large_permille: 880,
            },
            documentation: DocumentationTerms {
                base_permille: 650,
                per_document_permille: 175,
            },
            confidence: ConfidenceTerms {
                base: 82,
                floor: 55,
                ceiling: 95,
                cloud_above: 15.0,
                cloud_penalty: 8,
                min_documents: 2,
                documents_penalty: 12,
                ndvi_below: 0.25,
                ndvi_penalty: 7,
            },
        }
    }

    /// Highest-bound tier with `ndvi > bound`, else the floor tier
    ///
    /// Independent of the order `price_tiers` is declared in.
    pub fn vegetation_tier(&self, ndvi: f64) -> &PriceTier {
        self.price_tiers
            .iter()
            .filter(|tier| ndvi > tier.ndvi_above)
            .max_by(|a, b| a.ndvi_above.total_cmp(&b.ndvi_above))
            .unwrap_or(&self.floor_tier)
    }

    pub fn area_multiplier_permille(&self, area_sqm: f64) -> u64 {
        if area_sqm < self.area.small_below {
            self.area.small_permille
        } else if area_sqm < self.area.medium_below {
            self.area.medium_permille
        } else {
            self.area.large_permille
        }
    }

    pub fn documentation_multiplier_permille(&self, document_count: u32) -> u64 {
        let raised = self.documentation.base_permille.saturating_add(
            u64::from(document_count).saturating_mul(self.documentation.per_document_permille),
        );
        raised.min(PERMILLE)
    }
}

/// The calibrations shipped with terraval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileName {
    /// Profile A
    Standard,
    /// Profile B
    Conservative,
}

impl ProfileName {
    pub fn profile(self) -> ScoringProfile {
        match self {
            Self::Standard => ScoringProfile::standard(),
            Self::Conservative => ScoringProfile::conservative(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown scoring profile: {0} (expected standard or conservative)")]
pub struct UnknownProfile(pub String);

impl FromStr for ProfileName {
    type Err = UnknownProfile;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" | "a" => Ok(Self::Standard),
            "conservative" | "b" => Ok(Self::Conservative),
            _ => Err(UnknownProfile(s.to_string())),
        }
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Conservative => write!(f, "conservative"),
        }
    }
}
