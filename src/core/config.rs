//! Engine configuration with documented constants
//!
//! All bounds and delays are collected here with explanations of their
//! purpose. Passes and rounds are bounded by count rather than wall
//! clock because collaborator latency is externally variable.

use std::time::Duration;

/// Tunables for the placement engine and scaffold planner
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of build passes over the blueprint.
    ///
    /// Each pass can unlock placements the previous one could not make
    /// (a block needs an already-solid neighbor), so convergence may
    /// take several sweeps. A pass that places nothing ends the build
    /// phase early regardless of this bound.
    pub max_build_passes: u32,

    /// Maximum number of verify/repair rounds.
    ///
    /// A round with zero mismatches ends repair successfully; a round
    /// with mismatches but zero possible actions ends it as stalled.
    pub max_repair_rounds: u32,

    /// How far below a target the pillaring fallback scans for a solid
    /// floor before giving up on the column.
    pub max_pillar_depth: i32,

    /// Pause inserted after every world mutation.
    ///
    /// The world snapshot is eventually consistent with recent writes;
    /// this delay lets externally-observed state settle before the next
    /// query. Tests run with `Duration::ZERO`.
    pub settle_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_build_passes: 20,
            max_repair_rounds: 10,
            max_pillar_depth: 10,
            settle_delay: Duration::from_millis(50),
        }
    }
}

impl EngineConfig {
    /// Config with no settle delay, for deterministic in-memory worlds.
    pub fn instant() -> Self {
        Self {
            settle_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}
