/*!
 * Deterministic cost and duration estimates for a parsed episode.
 *
 * Both estimators are pure functions of the `Episode` and a rate or timing
 * table from the configuration, so the same script always produces the same
 * figures.
 */

pub mod costs;
pub mod timing;

pub use costs::{AudioCosts, ComponentCosts, CostAnalysis, ImageCosts, SpeakerCost, VoiceCosts, estimate_costs};
pub use timing::{SceneTiming, TimingEstimate, estimate_timing};

/// Round to 4 decimal places (currency amounts)
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Round to 2 decimal places (durations)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
