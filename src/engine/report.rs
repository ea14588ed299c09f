//! Per-job outcome report
//!
//! Per-coordinate failures never abort the job; they accumulate here
//! and surface in the final report. Only load failures and collaborator
//! faults travel the error path.

use serde::{Deserialize, Serialize};

use crate::blueprint::materials::MaterialReport;
use crate::core::types::BlockPos;

/// Why one coordinate could not be driven to its desired state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueKind {
    /// Required material absent from the inventory
    MissingMaterial,
    /// No placement reference and no scaffold strategy succeeded, or
    /// the navigator found no path
    Unreachable,
    /// The world refused the placement (obstruction, bad anchor)
    PlacementRejected,
    /// No scaffold material in stock when support was needed
    ScaffoldUnavailable,
    /// A foreign or wrong-material block could not be cleared
    RemovalFailed,
}

/// One flagged coordinate (world frame).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockIssue {
    pub pos: BlockPos,
    pub kind: IssueKind,
}

/// Everything a caller learns from a finished (or stopped) job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildReport {
    /// Successful blueprint placements (scaffolds not included)
    pub placed: u32,
    /// Successful removals (wrong materials, foreign objects, scaffolds)
    pub removed: u32,
    /// Blueprint cell count
    pub total: u32,
    /// Build passes actually executed
    pub build_passes: u32,
    /// Repair rounds actually executed
    pub repair_rounds: u32,
    /// Coordinates still not matching the blueprint after repair
    pub unresolved_mismatches: u32,
    /// Flagged coordinates, deduplicated per (position, kind)
    pub issues: Vec<BlockIssue>,
    /// Set when the job bounced off the material check
    pub shortfall: Option<MaterialReport>,
    /// Set when the job ended in the failed state
    pub failure: Option<String>,
}

impl BuildReport {
    pub fn new(total: u32) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Record an issue once; repeated flags for the same coordinate and
    /// kind across passes collapse into one entry.
    pub(crate) fn record_issue(&mut self, pos: BlockPos, kind: IssueKind) {
        let issue = BlockIssue { pos, kind };
        if !self.issues.contains(&issue) {
            self.issues.push(issue);
        }
    }

    /// Fully converged: nothing mismatched, nothing flagged.
    pub fn is_clean(&self) -> bool {
        self.unresolved_mismatches == 0 && self.issues.is_empty()
    }

    pub fn issues_at(&self, pos: BlockPos) -> impl Iterator<Item = &BlockIssue> {
        self.issues.iter().filter(move |issue| issue.pos == pos)
    }
}
