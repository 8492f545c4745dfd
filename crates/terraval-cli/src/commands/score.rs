//! `terraval score` - the deterministic scorer alone, no remote calls

use serde::Serialize;
use terraval_agents::fallback_sentence;
use terraval_scoring::{FactorBreakdown, ProfileName};

use super::{to_json, Failure, Outcome};
use crate::input;

#[derive(Debug, Serialize)]
struct ScoreOutput {
    profile: ProfileName,
    valuation: u64,
    confidence: u8,
    risk_factors: Vec<String>,
    factors: FactorBreakdown,
    narrative: String,
}

pub fn run(profile: ProfileName, raw_input: Option<String>) -> Outcome {
    let raw = input::read_raw(raw_input).map_err(Failure::input)?;
    let record = input::parse_record(&raw).map_err(Failure::input)?;

    let scored = profile.profile().score(&record);
    let narrative = fallback_sentence(&record, &scored.factors);
    let risk_factors = scored.risk_factors();

    to_json(&ScoreOutput {
        profile,
        valuation: scored.valuation,
        confidence: scored.confidence,
        risk_factors,
        factors: scored.factors,
        narrative,
    })
}
