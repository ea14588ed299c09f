//! Deterministic in-memory world for tests, benches and the demo binary
//!
//! `SimWorld` implements all three collaborator seams on one value and
//! keeps an operation log so tests can assert exactly which mutations a
//! job performed (including every scaffold placement). Failure
//! injection: coordinates can be marked unreachable for the navigator
//! or protected against removal.

use ahash::{AHashMap, AHashSet};

use crate::core::error::Result;
use crate::core::types::{BlockPos, MaterialId};
use crate::world::{AgentInventory, Face, Navigator, PlacementRef, WorldAccess};

/// One world mutation, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldOp {
    Place { pos: BlockPos, material: MaterialId },
    Remove { pos: BlockPos, material: MaterialId },
}

/// Sparse voxel world with an agent inventory bolted on.
#[derive(Debug, Clone, Default)]
pub struct SimWorld {
    blocks: AHashMap<BlockPos, MaterialId>,
    /// Flat unbreakable floor: every cell at or below this y is solid.
    bedrock: Option<(i32, MaterialId)>,
    inventory: AHashMap<MaterialId, u32>,
    selected: Option<MaterialId>,
    unreachable: AHashSet<BlockPos>,
    protected: AHashSet<BlockPos>,
    ops: Vec<WorldOp>,
}

impl SimWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// World with an infinite unbreakable floor at `y` and below.
    pub fn with_floor(y: i32, material: MaterialId) -> Self {
        Self {
            bedrock: Some((y, material)),
            ..Self::default()
        }
    }

    pub fn stock(&mut self, material: MaterialId, count: u32) {
        *self.inventory.entry(material).or_insert(0) += count;
    }

    /// Put a block into the world directly, bypassing the agent.
    pub fn set_block(&mut self, pos: BlockPos, material: MaterialId) {
        self.blocks.insert(pos, material);
    }

    pub fn block(&self, pos: BlockPos) -> Option<MaterialId> {
        if let Some(&material) = self.blocks.get(&pos) {
            return Some(material);
        }
        match self.bedrock {
            Some((floor, material)) if pos.y <= floor => Some(material),
            _ => None,
        }
    }

    /// Mark a coordinate as unreachable for the navigator.
    pub fn block_path_to(&mut self, pos: BlockPos) {
        self.unreachable.insert(pos);
    }

    /// Make a coordinate refuse removal.
    pub fn protect(&mut self, pos: BlockPos) {
        self.protected.insert(pos);
    }

    /// Every mutation performed through the agent, in order.
    pub fn ops(&self) -> &[WorldOp] {
        &self.ops
    }

    pub fn mutation_count(&self) -> usize {
        self.ops.len()
    }

    /// World coordinates currently holding the given material
    /// (excluding the bedrock floor).
    pub fn positions_of(&self, material: MaterialId) -> Vec<BlockPos> {
        self.blocks
            .iter()
            .filter(|&(_, &m)| m == material)
            .map(|(&pos, _)| pos)
            .collect()
    }
}

impl WorldAccess for SimWorld {
    fn block_at(&self, pos: BlockPos) -> Result<Option<MaterialId>> {
        Ok(self.block(pos))
    }

    fn placement_ref(&self, target: BlockPos) -> Result<Option<PlacementRef>> {
        for face in Face::SCAN_ORDER {
            let anchor = target - face.offset();
            if self.block(anchor).is_some() {
                return Ok(Some(PlacementRef { anchor, face }));
            }
        }
        Ok(None)
    }

    fn place(&mut self, at: PlacementRef) -> Result<bool> {
        let target = at.target();
        if self.block(at.anchor).is_none() || self.block(target).is_some() {
            return Ok(false);
        }
        let material = match self.selected {
            Some(m) => m,
            None => return Ok(false),
        };
        match self.inventory.get_mut(&material) {
            Some(count) if *count > 0 => *count -= 1,
            _ => return Ok(false),
        }
        self.blocks.insert(target, material);
        self.ops.push(WorldOp::Place {
            pos: target,
            material,
        });
        Ok(true)
    }

    fn remove(&mut self, pos: BlockPos) -> Result<bool> {
        if self.protected.contains(&pos) {
            return Ok(false);
        }
        let material = match self.blocks.get(&pos) {
            Some(&m) => m,
            // Bedrock and empty cells both refuse removal.
            None => return Ok(false),
        };
        self.blocks.remove(&pos);
        // Broken blocks drop their item back into the inventory.
        *self.inventory.entry(material).or_insert(0) += 1;
        self.ops.push(WorldOp::Remove { pos, material });
        Ok(true)
    }
}

impl Navigator for SimWorld {
    fn move_within_range(&mut self, pos: BlockPos) -> Result<bool> {
        Ok(!self.unreachable.contains(&pos))
    }
}

impl AgentInventory for SimWorld {
    fn count_of(&self, material: MaterialId) -> u32 {
        self.inventory.get(&material).copied().unwrap_or(0)
    }

    fn select(&mut self, material: MaterialId) -> Result<bool> {
        if self.count_of(material) == 0 {
            self.selected = None;
            return Ok(false);
        }
        self.selected = Some(material);
        Ok(true)
    }
}
