//! Build, verify/repair and cleanup passes
//!
//! Strictly sequential: one placement/removal/movement outstanding at a
//! time, because placement order matters physically (a block needs an
//! already-solid neighbor). Every decision re-queries the world; there
//! is no cached snapshot. Passes and rounds are bounded by count, and a
//! pass that makes zero progress is the internal stall signal.

use crate::blueprint::model::{Blueprint, Site};
use crate::core::config::EngineConfig;
use crate::core::error::Result;
use crate::core::types::{BlockPos, MaterialCatalog, MaterialId};
use crate::engine::job::{CancelToken, ProgressSink};
use crate::engine::report::{BuildReport, IssueKind};
use crate::engine::scaffold::ScaffoldRecord;
use crate::world::{AgentInventory, Navigator, WorldAccess};

/// Outcome of one sweep over the blueprint.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PassStats {
    /// Coordinates whose world state differed from the blueprint
    pub mismatches: u32,
    /// Mutations successfully performed
    pub actions: u32,
}

/// One job's pass driver. Borrows everything from the [`BuildJob`]
/// that owns it for the duration of a run.
///
/// [`BuildJob`]: crate::engine::job::BuildJob
pub(crate) struct PlacementEngine<'a, C> {
    pub(crate) world: &'a mut C,
    pub(crate) blueprint: &'a Blueprint,
    pub(crate) site: Site,
    pub(crate) catalog: &'a MaterialCatalog,
    pub(crate) config: &'a EngineConfig,
    pub(crate) cancel: &'a CancelToken,
    pub(crate) progress: &'a mut dyn ProgressSink,
    pub(crate) scaffold: ScaffoldRecord,
    pub(crate) report: &'a mut BuildReport,
}

impl<'a, C> PlacementEngine<'a, C>
where
    C: WorldAccess + Navigator + AgentInventory,
{
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        world: &'a mut C,
        blueprint: &'a Blueprint,
        site: Site,
        catalog: &'a MaterialCatalog,
        config: &'a EngineConfig,
        cancel: &'a CancelToken,
        progress: &'a mut dyn ProgressSink,
        report: &'a mut BuildReport,
    ) -> Self {
        Self {
            world,
            blueprint,
            site,
            catalog,
            config,
            cancel,
            progress,
            scaffold: ScaffoldRecord::new(),
            report,
        }
    }

    /// Build phase: drive empty in-footprint coordinates toward their
    /// desired material, bottom-up, until convergence or stall.
    pub(crate) fn run_build(&mut self) -> Result<()> {
        for pass in 1..=self.config.max_build_passes {
            self.check_cancel()?;
            self.report.build_passes = pass;
            let stats = self.build_pass()?;
            tracing::debug!(
                "Build pass {}: {} mismatches, {} placements",
                pass,
                stats.mismatches,
                stats.actions
            );
            // Every mismatch this pass was acted on successfully; the
            // next sweep would find nothing to do.
            if stats.actions == stats.mismatches {
                return Ok(());
            }
            if stats.actions == 0 {
                tracing::warn!(
                    "Build stalled after pass {} with {} mismatches left",
                    pass,
                    stats.mismatches
                );
                return Ok(());
            }
        }
        Ok(())
    }

    fn build_pass(&mut self) -> Result<PassStats> {
        let blueprint = self.blueprint;
        let mut stats = PassStats::default();
        for cell in blueprint.cells() {
            self.check_cancel()?;
            let target = self.site.to_world(cell.pos);
            match self.world.block_at(target)? {
                Some(m) if m == cell.material => continue,
                // Wrong material is the repair phase's business; a
                // placement attempt here would only be refused.
                Some(_) => {
                    stats.mismatches += 1;
                    continue;
                }
                None => {}
            }
            stats.mismatches += 1;
            if self.world.count_of(cell.material) == 0 {
                self.report.record_issue(target, IssueKind::MissingMaterial);
                continue;
            }
            if self.try_place(target, cell.material)? {
                stats.actions += 1;
            }
        }
        Ok(stats)
    }

    /// Repair phase: converge toward an exact match, replacing wrong
    /// materials and sweeping foreign objects out of the expanded
    /// footprint. Ends on a clean round, a stalled round, or the bound.
    pub(crate) fn run_repair(&mut self) -> Result<()> {
        for round in 1..=self.config.max_repair_rounds {
            self.check_cancel()?;
            self.report.repair_rounds = round;
            let stats = self.repair_round()?;
            tracing::debug!(
                "Repair round {}: {} mismatches, {} actions",
                round,
                stats.mismatches,
                stats.actions
            );
            if stats.mismatches == 0 {
                break;
            }
            if stats.actions == 0 {
                tracing::warn!(
                    "Repair stalled after round {} with {} mismatches left",
                    round,
                    stats.mismatches
                );
                break;
            }
        }
        self.report.unresolved_mismatches = self.audit()?;
        Ok(())
    }

    fn repair_round(&mut self) -> Result<PassStats> {
        let blueprint = self.blueprint;
        let mut stats = PassStats::default();

        // Every blueprint coordinate must hold exactly its material.
        for cell in blueprint.cells() {
            self.check_cancel()?;
            let target = self.site.to_world(cell.pos);
            let current = self.world.block_at(target)?;
            if current == Some(cell.material) {
                continue;
            }
            stats.mismatches += 1;
            if current.is_some() {
                if !self.try_remove(target)? {
                    continue;
                }
                stats.actions += 1;
            }
            if self.world.count_of(cell.material) == 0 {
                self.report.record_issue(target, IssueKind::MissingMaterial);
                continue;
            }
            if self.try_place(target, cell.material)? {
                stats.actions += 1;
            }
        }

        // Foreign-object sweep over the expanded footprint, full height
        // plus one above the tallest cell. Blueprint cells, implied
        // extensions and live scaffolds are whitelisted.
        let footprint = blueprint.footprint();
        for (x, z) in footprint.columns() {
            for y in footprint.sweep_ys() {
                self.check_cancel()?;
                let local = BlockPos::new(x, y, z);
                if blueprint.is_cell(local) || blueprint.is_implied(local) {
                    continue;
                }
                let target = self.site.to_world(local);
                if self.scaffold.contains(target) {
                    continue;
                }
                if self.world.block_at(target)?.is_none() {
                    continue;
                }
                stats.mismatches += 1;
                if self.try_remove(target)? {
                    stats.actions += 1;
                }
            }
        }

        Ok(stats)
    }

    /// Cleanup phase: dismantle recorded scaffolds outside the
    /// footprint, then sweep the expanded footprint once for residual
    /// scaffold material the record lost track of.
    pub(crate) fn run_cleanup(&mut self) -> Result<()> {
        let footprint = self.blueprint.footprint();

        for pos in self.scaffold.positions() {
            self.check_cancel()?;
            if footprint.contains(self.site.to_local(pos)) {
                continue;
            }
            self.try_remove(pos)?;
        }

        if let Some(scaffold_material) = self.catalog.scaffold() {
            let blueprint = self.blueprint;
            for (x, z) in footprint.columns() {
                for y in footprint.sweep_ys() {
                    self.check_cancel()?;
                    let local = BlockPos::new(x, y, z);
                    if blueprint.is_cell(local) || blueprint.is_implied(local) {
                        continue;
                    }
                    let target = self.site.to_world(local);
                    if self.world.block_at(target)? != Some(scaffold_material) {
                        continue;
                    }
                    self.try_remove(target)?;
                }
            }
        }

        // Entries that coincide with genuine blueprint cells are part
        // of the structure now, not scaffolding.
        for pos in self.scaffold.positions() {
            if self.blueprint.is_cell(self.site.to_local(pos)) {
                self.scaffold.forget(pos);
            }
        }

        if !self.scaffold.is_empty() {
            tracing::warn!(
                "{} scaffold blocks could not be dismantled",
                self.scaffold.len()
            );
        }
        Ok(())
    }

    /// Read-only mismatch count over the blueprint and the expanded
    /// footprint, used for the final report after repair terminates.
    fn audit(&mut self) -> Result<u32> {
        let blueprint = self.blueprint;
        let mut mismatches = 0;
        for cell in blueprint.cells() {
            let target = self.site.to_world(cell.pos);
            if self.world.block_at(target)? != Some(cell.material) {
                mismatches += 1;
            }
        }
        let footprint = blueprint.footprint();
        for (x, z) in footprint.columns() {
            for y in footprint.sweep_ys() {
                let local = BlockPos::new(x, y, z);
                if blueprint.is_cell(local) || blueprint.is_implied(local) {
                    continue;
                }
                let target = self.site.to_world(local);
                if self.scaffold.contains(target) {
                    continue;
                }
                if self.world.block_at(target)?.is_some() {
                    mismatches += 1;
                }
            }
        }
        Ok(mismatches)
    }

    /// Place one blueprint block: support, move, select, place.
    fn try_place(&mut self, target: BlockPos, material: MaterialId) -> Result<bool> {
        let Some(at) = self.ensure_support(target)? else {
            return Ok(false);
        };
        if !self.world.move_within_range(target)? {
            self.report.record_issue(target, IssueKind::Unreachable);
            return Ok(false);
        }
        if !self.world.select(material)? {
            self.report.record_issue(target, IssueKind::MissingMaterial);
            return Ok(false);
        }
        if !self.world.place(at)? {
            self.report.record_issue(target, IssueKind::PlacementRejected);
            return Ok(false);
        }
        self.report.placed += 1;
        self.progress.on_progress(self.report.placed, self.report.total);
        self.settle();
        Ok(true)
    }

    /// Remove one block: move, remove, drop any scaffold bookkeeping.
    fn try_remove(&mut self, pos: BlockPos) -> Result<bool> {
        if !self.world.move_within_range(pos)? {
            self.report.record_issue(pos, IssueKind::Unreachable);
            return Ok(false);
        }
        if !self.world.remove(pos)? {
            self.report.record_issue(pos, IssueKind::RemovalFailed);
            return Ok(false);
        }
        self.scaffold.forget(pos);
        self.report.removed += 1;
        self.settle();
        Ok(true)
    }

    pub(crate) fn check_cancel(&self) -> Result<()> {
        self.cancel.bail_if_cancelled()
    }

    /// Let externally-observed world state settle after a mutation.
    pub(crate) fn settle(&self) {
        if !self.config.settle_delay.is_zero() {
            std::thread::sleep(self.config.settle_delay);
        }
    }
}
