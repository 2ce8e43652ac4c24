//! Deterministic multi-criteria quote ranking
//!
//! score = 0.4 * 1/(fee + 1) + 0.3 * 1/(minutes + 1) + 0.3 * confidence

use crate::error::{BridgeError, BridgeResult};
use crate::types::BridgeQuote;

use serde::Serialize;
use std::cmp::Ordering;

pub const FEE_WEIGHT: f64 = 0.4;
pub const TIME_WEIGHT: f64 = 0.3;
pub const CONFIDENCE_WEIGHT: f64 = 0.3;

/// A quote with its ranking score
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedQuote {
    pub quote: BridgeQuote,
    pub score: f64,
}

pub fn score(quote: &BridgeQuote) -> f64 {
    let fee_score = 1.0 / (quote.fee() + 1.0);
    let time_score = 1.0 / (quote.estimated_time() as f64 + 1.0);
    FEE_WEIGHT * fee_score + TIME_WEIGHT * time_score + CONFIDENCE_WEIGHT * quote.confidence
}

/// All quotes, best first; equal scores keep their input order
pub fn rank(quotes: &[BridgeQuote]) -> Vec<RankedQuote> {
    let mut ranked: Vec<RankedQuote> = quotes
        .iter()
        .map(|quote| RankedQuote {
            score: score(quote),
            quote: quote.clone(),
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    ranked
}

/// Highest-scoring quote
pub fn select_best(quotes: &[BridgeQuote]) -> BridgeResult<BridgeQuote> {
    rank(quotes)
        .into_iter()
        .next()
        .map(|ranked| ranked.quote)
        .ok_or(BridgeError::EmptyQuoteSet)
}
