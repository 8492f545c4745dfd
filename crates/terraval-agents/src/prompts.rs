//! Prompt text sent to the remote models

use terraval_scoring::Scored;
use terraval_types::FeatureRecord;

pub const APPRAISER_SYSTEM: &str = "You are an expert real estate appraiser. \
Analyze property data and provide accurate valuations.";

pub const EXPLAINER_SYSTEM: &str = "You are an expert real estate appraiser. \
You explain valuations that have already been computed. Never change the numbers you are given.";

fn property_block(record: &FeatureRecord) -> String {
    format!(
        "PROPERTY DATA:\n\
         Location: {}, {}\n\
         Satellite Area: {} sqm\n\
         NDVI (vegetation): {}\n\
         Cloud Coverage: {}%\n\
         Documents: {} files",
        record.latitude(),
        record.longitude(),
        record.area_sqm(),
        record.ndvi(),
        record.cloud_coverage(),
        record.document_count(),
    )
}

/// Ask for a short justification of an already-computed result
pub fn grounded(record: &FeatureRecord, scored: &Scored) -> String {
    let factors = &scored.factors;
    format!(
        "{}\n\n\
         COMPUTED VALUATION:\n\
         Valuation: {} USD\n\
         Confidence: {}/100\n\
         Vegetation tier: {} ({} USD per sqm)\n\
         Area multiplier: {:.2}\n\
         Documentation multiplier: {:.2}\n\n\
         In one or two sentences of plain text, explain why this parcel received this valuation. \
         Do not restate the property data as a list and do not propose a different number.",
        property_block(record),
        scored.valuation,
        scored.confidence,
        factors.vegetation_tier,
        factors.base_price,
        factors.area_multiplier,
        factors.documentation_multiplier,
    )
}

/// Ask the model to propose the whole valuation object
pub fn ungrounded(record: &FeatureRecord) -> String {
    format!(
        "Analyze this real estate property and provide a valuation in JSON format.\n\n\
         {}\n\n\
         Provide valuation analysis. Return ONLY valid JSON with exactly these keys:\n\
         {{\n    \
             \"valuation\": <number in USD>,\n    \
             \"confidence\": <number 0-100>,\n    \
             \"reasoning\": \"<explanation>\",\n    \
             \"risk_factors\": [\"<risk1>\", \"<risk2>\"]\n\
         }}",
        property_block(record)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use terraval_scoring::ScoringProfile;

    fn record() -> FeatureRecord {
        FeatureRecord::new(40.7128, -74.006, 750.0, 0.55, 3.0, 2).unwrap()
    }

    #[test]
    fn test_grounded_prompt_embeds_result() {
        let scored = ScoringProfile::standard().score(&record());
        let prompt = grounded(&record(), &scored);
        assert!(prompt.contains("Valuation: 1567500 USD"));
        assert!(prompt.contains("Confidence: 85/100"));
        assert!(prompt.contains("moderate (2200 USD per sqm)"));
        assert!(prompt.contains("Area multiplier: 0.95"));
    }

    #[test]
    fn test_ungrounded_prompt_lists_required_keys() {
        let prompt = ungrounded(&record());
        for key in terraval_guard::REQUIRED_KEYS {
            assert!(prompt.contains(&format!("\"{}\"", key)), "{}", key);
        }
        assert!(prompt.contains("Satellite Area: 750 sqm"));
        assert!(prompt.contains("Documents: 2 files"));
    }
}
