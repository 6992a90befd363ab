use crate::{Counter, NUM_CORES, RawStats};
use serde::Serialize;

/// Metrics derived from raw counters
///
/// A metric is `None` whenever one of its inputs is unknown, its
/// denominator is zero or its value is not finite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DerivedMetrics {
    /// L1 data cache misses per kilo instructions
    pub l1_mpki: [Option<f64>; NUM_CORES],
    /// L1 data cache miss rate (%)
    pub l1_miss_percent: [Option<f64>; NUM_CORES],
    /// conditional branch misprediction rate (%)
    pub bp_miss_percent: [Option<f64>; NUM_CORES],
    /// shared L2 miss rate (%)
    pub l2_miss_percent: Option<f64>,
}

/// `scale * numerator / denominator`, unknown unless it is a finite number
fn ratio(scale: f64, numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    let value = scale * numerator / denominator;
    value.is_finite().then_some(value)
}

/// `100 * misses / (hits + misses)`
fn miss_percent(hits: Option<f64>, misses: Option<f64>) -> Option<f64> {
    let (hits, misses) = (hits?, misses?);
    ratio(100.0, misses, hits + misses)
}

impl DerivedMetrics {
    pub fn compute(raw: &RawStats) -> DerivedMetrics {
        let mut metrics = DerivedMetrics::default();
        for c in 0..NUM_CORES {
            let misses = raw.get(Counter::L1Misses(c));
            let hits = raw.get(Counter::L1Hits(c));

            metrics.l1_mpki[c] = match (misses, raw.get(Counter::Instructions(c))) {
                (Some(misses), Some(insts)) if insts > 0.0 => ratio(1000.0, misses, insts),
                _ => None,
            };
            metrics.l1_miss_percent[c] = miss_percent(hits, misses);

            // zero predicted branches means the predictor never ran
            metrics.bp_miss_percent[c] = match (
                raw.get(Counter::BranchIncorrect(c)),
                raw.get(Counter::BranchPredicted(c)),
            ) {
                (Some(incorrect), Some(predicted)) if predicted > 0.0 => {
                    ratio(100.0, incorrect, predicted)
                }
                _ => None,
            };
        }
        metrics.l2_miss_percent =
            miss_percent(raw.get(Counter::L2Hits), raw.get(Counter::L2Misses));
        metrics
    }
}
