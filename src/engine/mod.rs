//! Placement engine: multi-pass convergence toward a blueprint
//!
//! The engine drives the collaborator seams through three phases: a
//! build pass that fills empty in-footprint cells (synthesizing
//! scaffold support where no solid neighbor exists), a verify/repair
//! phase that corrects wrong materials and sweeps foreign objects out
//! of the expanded footprint, and a cleanup phase that dismantles every
//! temporary scaffold. The build job controller owns the state machine,
//! cancellation and progress reporting around those phases.

pub mod job;
pub mod passes;
pub mod report;
pub mod scaffold;

pub use job::{BuildJob, CancelToken, JobState, JobStatus, ProgressSink};
pub use report::{BlockIssue, BuildReport, IssueKind};
pub use scaffold::ScaffoldRecord;
