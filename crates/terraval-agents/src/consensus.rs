//! Consensus - combine the successful answers of one run
//!
//! Only success results take part. The final valuation is the
//! confidence-weighted mean; dispersion is reported as a 0-100 agreement
//! score derived from the coefficient of variation.

use serde::{Deserialize, Serialize};
use terraval_types::{AgentId, ValuationResult};
use thiserror::Error;

/// Fewest successful answers a consensus can be formed from
pub const MIN_RESPONSES: usize = 2;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    #[error("Need at least {required} valid responses for consensus, got {received}")]
    InsufficientResponses { required: usize, received: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusStatistics {
    pub average_valuation: u64,
    pub weighted_valuation: u64,
    pub standard_deviation: u64,
    pub min_valuation: u64,
    pub max_valuation: u64,
    pub average_confidence: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outlier {
    pub agent: AgentId,
    pub valuation: u64,
    /// Absolute distance from the mean valuation
    pub deviation: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeResponse {
    pub agent: AgentId,
    pub valuation: u64,
    pub confidence: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusReport {
    pub final_valuation: u64,
    pub final_confidence: u8,
    /// 100 means every agent agreed exactly
    pub consensus_score: u8,
    /// `final_confidence >= threshold`
    pub is_valid: bool,
    pub statistics: ConsensusStatistics,
    pub outliers: Vec<Outlier>,
    /// Union of every agent's risk factors, first-seen order
    pub risk_factors: Vec<String>,
    pub node_responses: Vec<NodeResponse>,
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation
fn standard_deviation(values: &[f64]) -> f64 {
    if values.len() <= 1 {
        return 0.0;
    }
    let avg = mean(values);
    let squared: Vec<f64> = values.iter().map(|v| (v - avg).powi(2)).collect();
    mean(&squared).sqrt()
}

/// Aggregate the successful results of a run
pub fn calculate_consensus(
    results: &[ValuationResult],
    threshold: u8,
) -> Result<ConsensusReport, ConsensusError> {
    let responses: Vec<(&AgentId, &terraval_types::Valuation)> = results
        .iter()
        .filter_map(|r| r.valuation().map(|v| (&r.agent, v)))
        .collect();

    if responses.len() < MIN_RESPONSES {
        return Err(ConsensusError::InsufficientResponses {
            required: MIN_RESPONSES,
            received: responses.len(),
        });
    }

    let valuations: Vec<f64> = responses.iter().map(|(_, v)| v.valuation as f64).collect();
    let confidences: Vec<f64> = responses.iter().map(|(_, v)| f64::from(v.confidence)).collect();

    let average_valuation = mean(&valuations);
    let deviation = standard_deviation(&valuations);
    let average_confidence = mean(&confidences);

    let total_weight: f64 = confidences.iter().sum();
    let weighted_valuation = if total_weight > 0.0 {
        valuations
            .iter()
            .zip(&confidences)
            .map(|(v, c)| v * c)
            .sum::<f64>()
            / total_weight
    } else {
        average_valuation
    };

    let outliers = responses
        .iter()
        .zip(&valuations)
        .filter_map(|((agent, v), value)| {
            let distance = (value - average_valuation).abs();
            (deviation > 0.0 && distance > 2.0 * deviation).then(|| Outlier {
                agent: (*agent).clone(),
                valuation: v.valuation,
                deviation: distance,
            })
        })
        .collect();

    let variation = if average_valuation > 0.0 {
        deviation / average_valuation * 100.0
    } else {
        0.0
    };
    let consensus_score = (100.0 - variation).round().clamp(0.0, 100.0) as u8;
    let final_confidence = average_confidence.round() as u8;

    let mut risk_factors: Vec<String> = Vec::new();
    for (_, v) in &responses {
        for risk in &v.risk_factors {
            if !risk_factors.contains(risk) {
                risk_factors.push(risk.clone());
            }
        }
    }

    let report = ConsensusReport {
        final_valuation: weighted_valuation.round() as u64,
        final_confidence,
        consensus_score,
        is_valid: final_confidence >= threshold,
        statistics: ConsensusStatistics {
            average_valuation: average_valuation.round() as u64,
            weighted_valuation: weighted_valuation.round() as u64,
            standard_deviation: deviation.round() as u64,
            min_valuation: responses.iter().map(|(_, v)| v.valuation).min().unwrap_or(0),
            max_valuation: responses.iter().map(|(_, v)| v.valuation).max().unwrap_or(0),
            average_confidence: final_confidence,
        },
        outliers,
        risk_factors,
        node_responses: responses
            .iter()
            .map(|(agent, v)| NodeResponse {
                agent: (*agent).clone(),
                valuation: v.valuation,
                confidence: v.confidence,
            })
            .collect(),
    };

    tracing::debug!(
        final_valuation = report.final_valuation,
        consensus_score = report.consensus_score,
        is_valid = report.is_valid,
        "consensus calculated"
    );

    Ok(report)
}
