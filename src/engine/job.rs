//! Build job controller and state machine
//!
//! One job owns one blueprint for its whole lifetime and walks
//! `Idle → MaterialCheck → Building → Repairing → CleaningUp → Done`,
//! with `Cancelled` and `Failed` reachable from any non-terminal state.
//! A failed material check returns the job to `Idle` (user-actionable,
//! not a failure). The controller always reaches a terminal state
//! because every pass and round underneath it is bounded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::blueprint::materials::plan_materials;
use crate::blueprint::model::{Blueprint, Cell, Site};
use crate::core::config::EngineConfig;
use crate::core::error::{EngineError, Result};
use crate::core::types::{JobId, MaterialCatalog};
use crate::engine::passes::PlacementEngine;
use crate::engine::report::BuildReport;
use crate::world::{AgentInventory, Navigator, WorldAccess};

/// Build job lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobState {
    Idle,
    Loading,
    MaterialCheck,
    Building,
    Repairing,
    CleaningUp,
    Done,
    Cancelled,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Done | JobState::Cancelled | JobState::Failed)
    }
}

/// Shared cooperative cancellation flag.
///
/// Checked at per-pass and per-coordinate granularity; in-flight
/// collaborator operations complete before the flag is honored.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn bail_if_cancelled(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(EngineError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Receiver for `(placed, total)` updates, called after every
/// successful blueprint placement.
pub trait ProgressSink {
    fn on_progress(&mut self, placed: u32, total: u32);
}

impl<F: FnMut(u32, u32)> ProgressSink for F {
    fn on_progress(&mut self, placed: u32, total: u32) {
        self(placed, total)
    }
}

/// Snapshot answer to a status query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    pub state: JobState,
    pub placed: u32,
    pub total: u32,
}

/// One construction request: blueprint + site + cancellation +
/// progress counters. At most one job may be running per agent; the
/// caller rejects concurrent starts before they reach this engine.
#[derive(Debug)]
pub struct BuildJob {
    id: JobId,
    blueprint: Blueprint,
    site: Site,
    state: JobState,
    cancel: CancelToken,
    report: BuildReport,
}

impl BuildJob {
    /// Normalize a cell list and create a job for it.
    ///
    /// This is the `Loading` edge of the state machine: a cell list the
    /// normalizer rejects yields [`EngineError::LoadFailure`] and no
    /// job value ever exists.
    pub fn load(cells: Vec<Cell>, site: Site, catalog: &MaterialCatalog) -> Result<Self> {
        let blueprint = Blueprint::from_cells(cells, catalog)?;
        Ok(Self::new(blueprint, site))
    }

    pub fn new(blueprint: Blueprint, site: Site) -> Self {
        let report = BuildReport::new(blueprint.len() as u32);
        Self {
            id: JobId::new(),
            blueprint,
            site,
            state: JobState::Idle,
            cancel: CancelToken::new(),
            report,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn blueprint(&self) -> &Blueprint {
        &self.blueprint
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    /// Token for cancelling this job from a progress callback or
    /// another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn status(&self) -> JobStatus {
        JobStatus {
            state: self.state,
            placed: self.report.placed,
            total: self.report.total,
        }
    }

    /// Run the job to a terminal state (or back to `Idle` on a material
    /// shortfall).
    ///
    /// Returns the report on every outcome except collaborator faults,
    /// which also leave the job `Failed` with the fault recorded.
    pub fn run<C>(
        &mut self,
        world: &mut C,
        catalog: &MaterialCatalog,
        config: &EngineConfig,
        progress: &mut dyn ProgressSink,
    ) -> Result<&BuildReport>
    where
        C: WorldAccess + Navigator + AgentInventory,
    {
        if self.state != JobState::Idle {
            return Err(EngineError::InvalidState(format!(
                "job {} already ran (state {:?})",
                self.id.0, self.state
            )));
        }

        self.state = JobState::MaterialCheck;
        let materials = plan_materials(&self.blueprint, world);
        if !materials.has_all() {
            let short = materials.missing().count();
            tracing::info!("Material check failed: {} materials short", short);
            self.report.shortfall = Some(materials);
            self.state = JobState::Idle;
            return Ok(&self.report);
        }

        tracing::info!(
            "Starting build of {} cells at {:?}",
            self.blueprint.len(),
            self.site.origin
        );
        match self.execute(world, catalog, config, progress) {
            Ok(()) => {
                self.state = JobState::Done;
                tracing::info!(
                    "Build done: {} placed, {} removed, {} unresolved, {} issues",
                    self.report.placed,
                    self.report.removed,
                    self.report.unresolved_mismatches,
                    self.report.issues.len()
                );
                Ok(&self.report)
            }
            Err(EngineError::Cancelled) => {
                self.state = JobState::Cancelled;
                tracing::info!("Build cancelled at {}/{}", self.report.placed, self.report.total);
                Ok(&self.report)
            }
            Err(fault) => {
                self.report.failure = Some(fault.to_string());
                self.state = JobState::Failed;
                Err(fault)
            }
        }
    }

    fn execute<C>(
        &mut self,
        world: &mut C,
        catalog: &MaterialCatalog,
        config: &EngineConfig,
        progress: &mut dyn ProgressSink,
    ) -> Result<()>
    where
        C: WorldAccess + Navigator + AgentInventory,
    {
        let mut engine = PlacementEngine::new(
            world,
            &self.blueprint,
            self.site,
            catalog,
            config,
            &self.cancel,
            progress,
            &mut self.report,
        );
        self.state = JobState::Building;
        engine.run_build()?;
        self.state = JobState::Repairing;
        engine.run_repair()?;
        self.state = JobState::CleaningUp;
        engine.run_cleanup()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{BlockPos, MaterialKind};
    use crate::world::SimWorld;

    fn small_job() -> (MaterialCatalog, SimWorld, BuildJob) {
        let mut catalog = MaterialCatalog::new();
        let stone = catalog.register("stone", MaterialKind::Block);
        catalog.register("dirt", MaterialKind::Scaffold);
        let mut world = SimWorld::with_floor(-1, stone);
        world.stock(stone, 8);
        let cells = vec![
            Cell {
                pos: BlockPos::new(0, 0, 0),
                material: stone,
            },
            Cell {
                pos: BlockPos::new(0, 1, 0),
                material: stone,
            },
        ];
        let site = Site::new(BlockPos::new(0, 0, 0), crate::blueprint::Orientation::North);
        let job = BuildJob::load(cells, site, &catalog).unwrap();
        (catalog, world, job)
    }

    #[test]
    fn test_job_runs_to_done() {
        let (catalog, mut world, mut job) = small_job();
        assert_eq!(job.state(), JobState::Idle);
        job.run(&mut world, &catalog, &EngineConfig::instant(), &mut |_, _| {})
            .unwrap();
        assert_eq!(job.state(), JobState::Done);
        assert_eq!(job.status().placed, 2);
        assert!(job.report().is_clean());
    }

    #[test]
    fn test_job_rejects_second_run() {
        let (catalog, mut world, mut job) = small_job();
        let config = EngineConfig::instant();
        job.run(&mut world, &catalog, &config, &mut |_, _| {}).unwrap();
        assert!(job.run(&mut world, &catalog, &config, &mut |_, _| {}).is_err());
    }

    #[test]
    fn test_load_failure_has_no_job() {
        let catalog = MaterialCatalog::new();
        let site = Site::new(BlockPos::new(0, 0, 0), crate::blueprint::Orientation::North);
        assert!(matches!(
            BuildJob::load(vec![], site, &catalog),
            Err(EngineError::LoadFailure(_))
        ));
    }

    #[test]
    fn test_cancel_token_shared() {
        let (_, _, job) = small_job();
        let token = job.cancel_token();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(job.cancel_token().is_cancelled());
        assert!(token.bail_if_cancelled().is_err());
    }

    #[test]
    fn test_terminal_states() {
        for state in [JobState::Done, JobState::Cancelled, JobState::Failed] {
            assert!(state.is_terminal());
        }
        for state in [
            JobState::Idle,
            JobState::Loading,
            JobState::MaterialCheck,
            JobState::Building,
            JobState::Repairing,
            JobState::CleaningUp,
        ] {
            assert!(!state.is_terminal());
        }
    }
}
