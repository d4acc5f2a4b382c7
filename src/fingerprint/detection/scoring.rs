//! Vendor scoring.
//!
//! Runs a vendor's matchers through the evaluator, accumulates weight and
//! evidence, and applies the vendor's effective threshold. The threshold is
//! hard: a vendor below it produces nothing.

use std::collections::BTreeMap;

use crate::config::SCORE_EPSILON;
use crate::fingerprint::context::MatchContext;
use crate::fingerprint::detection::matching::evaluate;
use crate::fingerprint::detection::DetectionResult;
use crate::fingerprint::models::{ScoringMode, SignatureCatalog, VendorDefinition};
use crate::fingerprint::patterns::truncate_for_log;

/// Scores one vendor against a context.
///
/// Returns `None` if nothing matched or the accumulated score is below the
/// vendor's effective threshold.
pub(crate) fn score_vendor(
    vendor: &VendorDefinition,
    ctx: &MatchContext,
    catalog: &SignatureCatalog,
) -> Option<DetectionResult> {
    let mut score = 0.0_f64;
    let mut matched_any = false;
    let mut evidence = BTreeMap::new();

    for matcher in &vendor.matchers {
        let Some(value) = evaluate(matcher, ctx) else {
            continue;
        };
        let weight = catalog.weight_for(matcher);
        log::trace!(
            "{}: {} matcher '{}' matched ({}), +{}",
            vendor.name,
            matcher.kind,
            truncate_for_log(matcher.pattern.as_deref().or(matcher.name.as_deref()).unwrap_or("")),
            value,
            weight
        );
        score += weight;
        matched_any = true;
        evidence
            .entry(matcher.kind)
            .or_insert_with(Vec::new)
            .push(value);
    }

    if !matched_any {
        return None;
    }

    let threshold = catalog.effective_threshold(vendor);
    if score + SCORE_EPSILON < threshold {
        log::debug!(
            "{}: score {} below threshold {}, not reported",
            vendor.name,
            score,
            threshold
        );
        return None;
    }

    let denominator = match catalog.scoring_mode {
        ScoringMode::Threshold => threshold,
        ScoringMode::Coverage => max_score(vendor, catalog),
    };

    Some(DetectionResult {
        confidence: confidence(score, denominator),
        evidence,
    })
}

/// Sum of the weights of every usable matcher of `vendor`.
pub(crate) fn max_score(vendor: &VendorDefinition, catalog: &SignatureCatalog) -> f64 {
    vendor
        .matchers
        .iter()
        .filter(|m| m.is_usable())
        .map(|m| catalog.weight_for(m))
        .sum()
}

/// `score / denominator`, capped at 1.0 and rounded to two decimals (half to even).
pub(crate) fn confidence(score: f64, denominator: f64) -> f64 {
    if denominator <= 0.0 || !denominator.is_finite() {
        return 1.0;
    }
    let ratio = (score / denominator).clamp(0.0, 1.0);
    (ratio * 100.0).round_ties_even() / 100.0
}
