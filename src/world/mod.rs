//! Collaborator seams: world access, navigation, agent inventory
//!
//! The engine never owns the world. Every decision re-queries these
//! traits because the world is externally mutable (other agents, decay,
//! gravity); there is no persistent snapshot cache.
//!
//! Recoverable refusals (`Ok(false)`) are distinct from collaborator
//! faults (`Err`): a refused placement or an unreachable coordinate is
//! retried or reported per coordinate, a fault aborts the job.

pub mod sim;

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::{BlockPos, MaterialId};

pub use sim::{SimWorld, WorldOp};

/// Contact face of a placement reference, named from the reference
/// block's perspective (the new block appears on this side of it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    Down,
    Up,
    North,
    South,
    East,
    West,
}

impl Face {
    /// Offset from the reference block to the placed block.
    pub fn offset(self) -> BlockPos {
        match self {
            Face::Down => BlockPos::new(0, -1, 0),
            Face::Up => BlockPos::new(0, 1, 0),
            Face::North => BlockPos::new(0, 0, -1),
            Face::South => BlockPos::new(0, 0, 1),
            Face::East => BlockPos::new(1, 0, 0),
            Face::West => BlockPos::new(-1, 0, 0),
        }
    }

    /// Neighbor scan order for placement references and scaffold
    /// candidates: below first, then the four horizontals, above last.
    pub const SCAN_ORDER: [Face; 6] = [
        Face::Up, // anchor below the target, clicked on its upper face
        Face::North,
        Face::South,
        Face::East,
        Face::West,
        Face::Down,
    ];
}

/// Reference block + contact face identifying one placement.
///
/// The placed block materializes at `anchor + face.offset()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRef {
    pub anchor: BlockPos,
    pub face: Face,
}

impl PlacementRef {
    pub fn target(&self) -> BlockPos {
        self.anchor + self.face.offset()
    }
}

/// Read and mutate blocks in the live world.
pub trait WorldAccess {
    /// Material at a world coordinate, `None` when empty.
    fn block_at(&self, pos: BlockPos) -> Result<Option<MaterialId>>;

    /// A valid reference for placing into `target`, if any solid
    /// neighbor exists within reach.
    fn placement_ref(&self, target: BlockPos) -> Result<Option<PlacementRef>>;

    /// Place the currently selected material. `Ok(false)` means the
    /// world refused (obstruction, no selection, bad anchor).
    fn place(&mut self, at: PlacementRef) -> Result<bool>;

    /// Remove the block at a world coordinate. `Ok(false)` means the
    /// world refused (nothing there, or unbreakable).
    fn remove(&mut self, pos: BlockPos) -> Result<bool>;
}

/// Move the agent within placement/removal range of a coordinate.
pub trait Navigator {
    /// `Ok(false)` means no path this pass; the coordinate may become
    /// reachable once other placements land.
    fn move_within_range(&mut self, pos: BlockPos) -> Result<bool>;
}

/// The agent's material stock and held-item selection.
pub trait AgentInventory {
    fn count_of(&self, material: MaterialId) -> u32;

    /// Select a material for the next placement. `Ok(false)` when none
    /// is in stock.
    fn select(&mut self, material: MaterialId) -> Result<bool>;
}
