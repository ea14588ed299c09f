//! Scaffold planner: temporary support synthesis
//!
//! When a target has no solid neighbor, the world cannot compute a
//! placement reference for it. The planner synthesizes one with two
//! strategies, first success wins: an adjacent-slot scan that puts a
//! single scaffold block next to the target, and a pillaring fallback
//! that stacks scaffolds up from the nearest floor below. Every placed
//! scaffold is recorded so cleanup can dismantle it.

use ahash::AHashSet;

use crate::core::error::Result;
use crate::core::types::{BlockPos, MaterialId};
use crate::engine::passes::PlacementEngine;
use crate::engine::report::IssueKind;
use crate::world::{AgentInventory, Face, Navigator, PlacementRef, WorldAccess};

/// World coordinates where the engine itself placed scaffold material.
///
/// Owned by one build job. At job completion no entry may remain
/// outside the footprint, and an entry inside the footprint may only
/// survive where the blueprint genuinely specifies that material.
#[derive(Debug, Clone, Default)]
pub struct ScaffoldRecord {
    placed: AHashSet<BlockPos>,
}

impl ScaffoldRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, pos: BlockPos) {
        self.placed.insert(pos);
    }

    pub fn forget(&mut self, pos: BlockPos) -> bool {
        self.placed.remove(&pos)
    }

    pub fn contains(&self, pos: BlockPos) -> bool {
        self.placed.contains(&pos)
    }

    /// Snapshot of recorded positions, highest first so pillars are
    /// dismantled top-down.
    pub fn positions(&self) -> Vec<BlockPos> {
        let mut positions: Vec<BlockPos> = self.placed.iter().copied().collect();
        positions.sort_by_key(|p| (std::cmp::Reverse(p.y), p.x, p.z));
        positions
    }

    pub fn len(&self) -> usize {
        self.placed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }
}

impl<C> PlacementEngine<'_, C>
where
    C: WorldAccess + Navigator + AgentInventory,
{
    /// Obtain a placement reference for `target`, synthesizing scaffold
    /// support when no solid neighbor exists.
    ///
    /// `None` means the coordinate stays un-placeable this pass; the
    /// cause has been recorded in the report. Not fatal: later passes
    /// retry, since other placements may unlock reachability.
    pub(crate) fn ensure_support(&mut self, target: BlockPos) -> Result<Option<PlacementRef>> {
        if let Some(at) = self.world.placement_ref(target)? {
            return Ok(Some(at));
        }

        let material = match self.catalog.scaffold() {
            Some(m) if self.world.count_of(m) > 0 => m,
            _ => {
                self.report.record_issue(target, IssueKind::ScaffoldUnavailable);
                return Ok(None);
            }
        };

        if self.adjacent_slot(target, material)? || self.pillar_fallback(target, material)? {
            if let Some(at) = self.world.placement_ref(target)? {
                return Ok(Some(at));
            }
        }
        self.report.record_issue(target, IssueKind::Unreachable);
        Ok(None)
    }

    /// Whether a scaffold may occupy this world coordinate at all.
    /// Strictly-below-roof cells are structure interior and must stay
    /// clear for the blueprint's own blocks.
    fn scaffold_allowed(&self, pos: BlockPos) -> bool {
        !self.blueprint.is_exclusion_interior(self.site.to_local(pos))
    }

    /// Strategy 1: put one scaffold into an empty neighbor slot of the
    /// target, below first, horizontals next, above last.
    fn adjacent_slot(&mut self, target: BlockPos, material: MaterialId) -> Result<bool> {
        for face in Face::SCAN_ORDER {
            let candidate = target - face.offset();
            if self.world.block_at(candidate)?.is_some() {
                continue;
            }
            if !self.scaffold_allowed(candidate) {
                continue;
            }
            let Some(at) = self.world.placement_ref(candidate)? else {
                continue;
            };
            if self.place_scaffold(candidate, at, material)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Strategy 2: raise a pillar whose top block becomes an anchor for
    /// the target. The column straight below the target is tried first;
    /// it is usually exclusion interior (the target is its own column's
    /// roof), so the four horizontally adjacent columns follow, where a
    /// pillar top at the target's height provides a lateral anchor.
    fn pillar_fallback(&mut self, target: BlockPos, material: MaterialId) -> Result<bool> {
        let below = target - BlockPos::new(0, 1, 0);
        if self.pillar_column(below, material)? {
            return Ok(true);
        }
        for face in [Face::North, Face::South, Face::East, Face::West] {
            let top = target - face.offset();
            if self.pillar_column(top, material)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Build one scaffold pillar from the nearest floor up to and
    /// including `top`. Interior links are skipped, not placed; a
    /// refused link aborts the pillar.
    fn pillar_column(&mut self, top: BlockPos, material: MaterialId) -> Result<bool> {
        // A solid top would already have served as an anchor, and an
        // excluded top can never be placed.
        if self.world.block_at(top)?.is_some() || !self.scaffold_allowed(top) {
            return Ok(false);
        }

        let mut floor_y = None;
        for depth in 1..=self.config.max_pillar_depth {
            let probe = top - BlockPos::new(0, depth, 0);
            if self.world.block_at(probe)?.is_some() {
                floor_y = Some(probe.y);
                break;
            }
        }
        let Some(floor_y) = floor_y else {
            return Ok(false);
        };

        for y in (floor_y + 1)..=top.y {
            let link = BlockPos::new(top.x, y, top.z);
            if self.world.block_at(link)?.is_some() {
                continue;
            }
            if !self.scaffold_allowed(link) {
                continue;
            }
            let Some(at) = self.world.placement_ref(link)? else {
                return Ok(false);
            };
            if !self.place_scaffold(link, at, material)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn place_scaffold(
        &mut self,
        pos: BlockPos,
        at: PlacementRef,
        material: MaterialId,
    ) -> Result<bool> {
        if !self.world.move_within_range(pos)? {
            return Ok(false);
        }
        if !self.world.select(material)? {
            return Ok(false);
        }
        if !self.world.place(at)? {
            return Ok(false);
        }
        self.scaffold.record(pos);
        tracing::debug!("Placed scaffold at {:?}", pos);
        self.settle();
        Ok(true)
    }
}
