//! The tiered multiplicative scorer

use serde::{Deserialize, Serialize};
use terraval_types::FeatureRecord;

use crate::profile::{ScoringProfile, PERMILLE};

/// Which threshold check fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyKind {
    CloudCoverage,
    Documentation,
    Vegetation,
}

/// A confidence penalty that fired, with the value that triggered it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidencePenalty {
    pub kind: PenaltyKind,
    pub points: u8,
    pub observed: f64,
    pub threshold: f64,
}

impl ConfidencePenalty {
    /// Human-readable risk factor for this check
    pub fn risk_factor(&self) -> String {
        match self.kind {
            PenaltyKind::CloudCoverage => format!(
                "High cloud coverage ({:.1}%) may reduce imagery reliability",
                self.observed
            ),
            PenaltyKind::Documentation => format!(
                "Insufficient documentation ({} of {} required documents supplied)",
                self.observed, self.threshold
            ),
            PenaltyKind::Vegetation => format!(
                "Low vegetation index (NDVI {:.2}) suggests poor land condition",
                self.observed
            ),
        }
    }
}

/// The coefficients actually applied to one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorBreakdown {
    pub profile: String,
    pub base_price: u64,
    pub vegetation_tier: String,
    pub area_multiplier: f64,
    pub documentation_multiplier: f64,
    /// True when the record meets the profile's minimum document count
    pub documentation_complete: bool,
    pub confidence_base: u8,
    /// In check order: cloud, documentation, vegetation
    pub penalties: Vec<ConfidencePenalty>,
}

/// Deterministic scorer output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scored {
    pub valuation: u64,
    pub confidence: u8,
    pub factors: FactorBreakdown,
}

impl Scored {
    /// Risk factors from the same checks that drove the confidence penalties
    pub fn risk_factors(&self) -> Vec<String> {
        self.factors
            .penalties
            .iter()
            .map(ConfidencePenalty::risk_factor)
            .collect()
    }
}

impl ScoringProfile {
    /// Score a record under this profile
    pub fn score(&self, record: &FeatureRecord) -> Scored {
        score(self, record)
    }
}

/// Score a record under `profile`. Pure and total.
pub fn score(profile: &ScoringProfile, record: &FeatureRecord) -> Scored {
    let tier = profile.vegetation_tier(record.ndvi());
    let area_permille = profile.area_multiplier_permille(record.area_sqm());
    let doc_permille = profile.documentation_multiplier_permille(record.document_count());

    // Integer product first, so the only float step is the final area scaling.
    let unit_factor = tier
        .price
        .saturating_mul(area_permille)
        .saturating_mul(doc_permille);
    let raw = record.area_sqm() * unit_factor as f64 / (PERMILLE * PERMILLE) as f64;
    // `as` truncates toward zero and saturates, which is the rounding we want
    let valuation = raw as u64;

    let penalties = penalties(profile, record);
    let confidence = confidence(profile, &penalties);

    tracing::debug!(
        profile = %profile.name,
        base_price = tier.price,
        area_permille,
        doc_permille,
        valuation,
        confidence,
        "scored feature record"
    );

    Scored {
        valuation,
        confidence,
        factors: FactorBreakdown {
            profile: profile.name.clone(),
            base_price: tier.price,
            vegetation_tier: tier.label.clone(),
            area_multiplier: area_permille as f64 / PERMILLE as f64,
            documentation_multiplier: doc_permille as f64 / PERMILLE as f64,
            documentation_complete: record.document_count() >= profile.confidence.min_documents,
            confidence_base: profile.confidence.base,
            penalties,
        },
    }
}

fn penalties(profile: &ScoringProfile, record: &FeatureRecord) -> Vec<ConfidencePenalty> {
    let terms = &profile.confidence;

    let cloud = (record.cloud_coverage() > terms.cloud_above).then(|| ConfidencePenalty {
        kind: PenaltyKind::CloudCoverage,
        points: terms.cloud_penalty,
        observed: record.cloud_coverage(),
        threshold: terms.cloud_above,
    });
    let documentation =
        (record.document_count() < terms.min_documents).then(|| ConfidencePenalty {
            kind: PenaltyKind::Documentation,
            points: terms.documents_penalty,
            observed: f64::from(record.document_count()),
            threshold: f64::from(terms.min_documents),
        });
    let vegetation = (record.ndvi() < terms.ndvi_below).then(|| ConfidencePenalty {
        kind: PenaltyKind::Vegetation,
        points: terms.ndvi_penalty,
        observed: record.ndvi(),
        threshold: terms.ndvi_below,
    });

    [cloud, documentation, vegetation].into_iter().flatten().collect()
}

fn confidence(profile: &ScoringProfile, penalties: &[ConfidencePenalty]) -> u8 {
    let terms = &profile.confidence;
    let deducted: i32 = penalties.iter().map(|p| i32::from(p.points)).sum();
    let raw = i32::from(terms.base) - deducted;
    // an inverted pair is read as the same band
    let low = terms.floor.min(terms.ceiling);
    let high = terms.floor.max(terms.ceiling);
    let clamped = raw.clamp(i32::from(low), i32::from(high));
    u8::try_from(clamped).unwrap_or(low)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(area: f64, ndvi: f64, cloud: f64, docs: u32) -> FeatureRecord {
        FeatureRecord::new(40.7128, -74.006, area, ndvi, cloud, docs).unwrap()
    }

    #[test]
    fn test_standard_end_to_end_example() {
        let scored = ScoringProfile::standard().score(&record(750.0, 0.55, 3.0, 2));

        assert_eq!(scored.factors.base_price, 2200);
        assert_eq!(scored.factors.area_multiplier, 0.95);
        assert_eq!(scored.factors.documentation_multiplier, 1.0);
        assert_eq!(scored.valuation, 1_567_500);
        assert_eq!(scored.confidence, 85);
        assert!(scored.factors.penalties.is_empty());
        assert!(scored.risk_factors().is_empty());
    }

    #[test]
    fn test_conservative_end_to_end_example() {
        // 0.55 > 0.5 selects the 2400 tier of the conservative table
        let scored = ScoringProfile::conservative().score(&record(750.0, 0.55, 3.0, 2));

        assert_eq!(scored.factors.base_price, 2400);
        assert_eq!(scored.factors.area_multiplier, 0.93);
        assert_eq!(scored.factors.documentation_multiplier, 1.0);
        assert_eq!(scored.valuation, 1_674_000);
        assert_eq!(scored.confidence, 82);
    }

    #[test]
    fn test_conservative_fair_tier_valuation() {
        let scored = ScoringProfile::conservative().score(&record(750.0, 0.45, 3.0, 2));

        assert_eq!(scored.factors.base_price, 2000);
        assert_eq!(scored.valuation, 1_395_000);
        assert_eq!(scored.confidence, 82);
    }

    #[test]
    fn test_valuation_truncates_toward_zero() {
        // 333.5 * 1800 * 1.0 * 0.85 = 510255.0
        let scored = ScoringProfile::standard().score(&record(333.5, 0.1, 0.0, 1));
        assert_eq!(scored.valuation, 510_255);

        // 0.99 * 1800 * 0.85 = 1514.7
        let scored = ScoringProfile::standard().score(&record(0.99, 0.1, 0.0, 1));
        assert_eq!(scored.valuation, 1514);

        let scored = ScoringProfile::standard().score(&record(0.5, 0.1, 0.0, 0));
        // 0.5 * 1800 * 0.7 = 630
        assert_eq!(scored.valuation, 630);

        let scored = ScoringProfile::standard().score(&record(1.001, 0.1, 0.0, 0));
        // 1.001 * 1260 = 1261.26
        assert_eq!(scored.valuation, 1261);
    }

    #[test]
    fn test_valuation_matches_formula_across_tiers() {
        let profile = ScoringProfile::standard();
        for (area, ndvi, docs) in [(120.0, 0.7, 0), (640.0, 0.45, 1), (2500.0, 0.2, 5)] {
            let scored = profile.score(&record(area, ndvi, 0.0, docs));
            let factors = &scored.factors;
            let expected = (area
                * (factors.base_price as f64)
                * (factors.area_multiplier * 1000.0).round()
                * (factors.documentation_multiplier * 1000.0).round()
                / 1_000_000.0)
                .floor() as u64;
            assert_eq!(scored.valuation, expected, "area {} ndvi {}", area, ndvi);
        }
    }

    #[test]
    fn test_penalties_apply_independently_and_clamp() {
        let standard = ScoringProfile::standard();
        let all = standard.score(&record(100.0, 0.1, 50.0, 0));
        // 85 - 5 - 10 - 5 = 65
        assert_eq!(all.confidence, 65);
        assert_eq!(all.factors.penalties.len(), 3);

        let conservative = ScoringProfile::conservative();
        let all = conservative.score(&record(100.0, 0.1, 50.0, 0));
        // 82 - 8 - 12 - 7 = 55, exactly the floor
        assert_eq!(all.confidence, 55);
    }

    #[test]
    fn test_confidence_stays_within_profile_bounds() {
        let mut harsh = ScoringProfile::standard();
        harsh.confidence.cloud_penalty = 40;
        harsh.confidence.documents_penalty = 40;
        harsh.confidence.ndvi_penalty = 40;
        let scored = harsh.score(&record(100.0, 0.0, 100.0, 0));
        assert_eq!(scored.confidence, 60);

        let mut generous = ScoringProfile::standard();
        generous.confidence.base = 100;
        let scored = generous.score(&record(100.0, 0.9, 0.0, 5));
        assert_eq!(scored.confidence, 95);

        for profile in [ScoringProfile::standard(), ScoringProfile::conservative()] {
            for cloud in [0.0, 12.0, 20.0, 100.0] {
                for docs in [0, 1, 2, 9] {
                    for ndvi in [-1.0, 0.0, 0.2, 0.28, 0.5, 1.0] {
                        let c = profile.score(&record(300.0, ndvi, cloud, docs)).confidence;
                        assert!(c >= profile.confidence.floor && c <= profile.confidence.ceiling);
                    }
                }
            }
        }
    }

    #[test]
    fn test_risk_factors_follow_check_order() {
        let scored = ScoringProfile::standard().score(&record(100.0, 0.1, 50.0, 1));
        let risks = scored.risk_factors();

        assert_eq!(risks.len(), 3);
        assert!(risks[0].starts_with("High cloud coverage"));
        assert!(risks[1].starts_with("Insufficient documentation"));
        assert!(risks[2].starts_with("Low vegetation index"));
        assert!(risks.iter().all(|r| !r.is_empty()));
    }

    #[test]
    fn test_threshold_values_do_not_trigger_penalties() {
        // cloud exactly 10 is not > 10; ndvi exactly 0.3 is not < 0.3
        let scored = ScoringProfile::standard().score(&record(100.0, 0.3, 10.0, 2));
        assert!(scored.factors.penalties.is_empty());
        assert_eq!(scored.confidence, 85);
    }

    #[test]
    fn test_breakdown_serializes() {
        let scored = ScoringProfile::standard().score(&record(750.0, 0.55, 3.0, 2));
        let value = serde_json::to_value(&scored.factors).unwrap();
        assert_eq!(value["vegetation_tier"], "moderate");
        assert_eq!(value["base_price"], 2200);
    }

    #[test]
    fn test_inverted_confidence_band_does_not_panic() {
        let mut profile = ScoringProfile::standard();
        profile.confidence.floor = 96;
        profile.confidence.ceiling = 95;

        let scored = profile.score(&record(750.0, 0.55, 3.0, 2));
        assert_eq!(scored.confidence, 95);

        profile.confidence.base = 40;
        let scored = profile.score(&record(750.0, 0.55, 3.0, 2));
        assert_eq!(scored.confidence, 95);
    }
}
