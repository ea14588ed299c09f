//! Material planner - diffs blueprint requirements against inventory
//!
//! Read-only: this gates whether a job may leave `MaterialCheck`. On a
//! shortfall the job reports the deficit and returns to idle without
//! touching the world.

use serde::{Deserialize, Serialize};

use crate::blueprint::model::Blueprint;
use crate::core::types::MaterialId;
use crate::world::AgentInventory;

/// Requirement line for one distinct material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialLine {
    pub material: MaterialId,
    pub required: u32,
    pub available: u32,
    pub missing: u32,
}

/// Sufficiency report over every material the blueprint uses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialReport {
    pub lines: Vec<MaterialLine>,
}

impl MaterialReport {
    pub fn has_all(&self) -> bool {
        self.lines.iter().all(|line| line.missing == 0)
    }

    /// Lines with a nonzero deficit.
    pub fn missing(&self) -> impl Iterator<Item = &MaterialLine> {
        self.lines.iter().filter(|line| line.missing > 0)
    }
}

/// Diff the blueprint's material tallies against the agent's inventory.
pub fn plan_materials(blueprint: &Blueprint, inventory: &impl AgentInventory) -> MaterialReport {
    let mut lines: Vec<MaterialLine> = blueprint
        .material_tallies()
        .iter()
        .map(|(&material, &required)| {
            let available = inventory.count_of(material);
            MaterialLine {
                material,
                required,
                available,
                missing: required.saturating_sub(available),
            }
        })
        .collect();
    lines.sort_by_key(|line| line.material.0);
    MaterialReport { lines }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::model::Cell;
    use crate::core::types::{BlockPos, MaterialCatalog, MaterialKind};
    use crate::world::sim::SimWorld;

    fn fixture() -> (MaterialCatalog, MaterialId, MaterialId, Blueprint) {
        let mut catalog = MaterialCatalog::new();
        let stone = catalog.register("stone", MaterialKind::Block);
        let glass = catalog.register("glass", MaterialKind::Block);
        let cells = vec![
            Cell {
                pos: BlockPos::new(0, 0, 0),
                material: stone,
            },
            Cell {
                pos: BlockPos::new(1, 0, 0),
                material: stone,
            },
            Cell {
                pos: BlockPos::new(2, 0, 0),
                material: glass,
            },
        ];
        let bp = Blueprint::from_cells(cells, &catalog).unwrap();
        (catalog, stone, glass, bp)
    }

    #[test]
    fn test_sufficient_inventory() {
        let (_, stone, glass, bp) = fixture();
        let mut world = SimWorld::new();
        world.stock(stone, 2);
        world.stock(glass, 5);

        let report = plan_materials(&bp, &world);
        assert!(report.has_all());
        assert_eq!(report.missing().count(), 0);
    }

    #[test]
    fn test_shortfall_reported_per_material() {
        let (_, stone, glass, bp) = fixture();
        let mut world = SimWorld::new();
        world.stock(stone, 1);

        let report = plan_materials(&bp, &world);
        assert!(!report.has_all());

        let stone_line = report
            .lines
            .iter()
            .find(|l| l.material == stone)
            .unwrap();
        assert_eq!(stone_line.required, 2);
        assert_eq!(stone_line.available, 1);
        assert_eq!(stone_line.missing, 1);

        let glass_line = report
            .lines
            .iter()
            .find(|l| l.material == glass)
            .unwrap();
        assert_eq!(glass_line.missing, 1);
    }

    #[test]
    fn test_surplus_is_not_a_deficit() {
        let (_, stone, glass, bp) = fixture();
        let mut world = SimWorld::new();
        world.stock(stone, 100);
        world.stock(glass, 100);

        let report = plan_materials(&bp, &world);
        assert!(report.has_all());
        let stone_line = report
            .lines
            .iter()
            .find(|l| l.material == stone)
            .unwrap();
        assert_eq!(stone_line.missing, 0);
        assert_eq!(stone_line.available, 100);
    }
}
