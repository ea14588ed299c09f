//! Voxel blueprint model and material planning
//!
//! A blueprint is an immutable, normalized set of non-empty cells in
//! blueprint-local coordinates, produced by an external loader. This
//! module derives everything the placement engine needs from it at load
//! time: the footprint, the per-column exclusion height map, and the
//! implied-extension whitelist for multi-cell materials.

pub mod materials;
pub mod model;

pub use materials::{plan_materials, MaterialLine, MaterialReport};
pub use model::{Blueprint, BlueprintSummary, Cell, Footprint, Orientation, Site};
