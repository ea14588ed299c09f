//! Blueprint data model: cells, footprint, exclusion map, site mapping

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, Result};
use crate::core::types::{BlockPos, MaterialCatalog, MaterialId, MaterialKind};

/// One coordinate+material entry in a blueprint.
///
/// Positions are blueprint-local offsets from the origin cell. Empty
/// cells are never materialized; absence of an entry means "must be
/// empty" inside the footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub pos: BlockPos,
    pub material: MaterialId,
}

/// Cardinal facing applied when mapping blueprint-local coordinates
/// into the world. North is the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    North,
    East,
    South,
    West,
}

impl Orientation {
    /// Rotate a local offset about the vertical axis.
    pub fn apply(self, p: BlockPos) -> BlockPos {
        match self {
            Orientation::North => p,
            Orientation::East => BlockPos::new(-p.z, p.y, p.x),
            Orientation::South => BlockPos::new(-p.x, p.y, -p.z),
            Orientation::West => BlockPos::new(p.z, p.y, -p.x),
        }
    }

    /// Inverse rotation of [`Orientation::apply`].
    pub fn invert(self, p: BlockPos) -> BlockPos {
        match self {
            Orientation::North => p,
            Orientation::East => Orientation::West.apply(p),
            Orientation::South => Orientation::South.apply(p),
            Orientation::West => Orientation::East.apply(p),
        }
    }
}

/// Where a blueprint is being realized: world origin plus facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub origin: BlockPos,
    pub orientation: Orientation,
}

impl Site {
    pub fn new(origin: BlockPos, orientation: Orientation) -> Self {
        Self {
            origin,
            orientation,
        }
    }

    pub fn to_world(&self, local: BlockPos) -> BlockPos {
        self.origin + self.orientation.apply(local)
    }

    pub fn to_local(&self, world: BlockPos) -> BlockPos {
        self.orientation.invert(world - self.origin)
    }
}

/// Axis-aligned bounding box of all blueprint cells, expanded by one
/// unit on each horizontal axis. Local frame, inclusive bounds.
///
/// `max.y` is the height of the tallest cell; vertical expansion is not
/// part of the footprint itself, only of the repair sweep range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footprint {
    pub min: BlockPos,
    pub max: BlockPos,
}

impl Footprint {
    pub fn contains(&self, p: BlockPos) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Like [`Footprint::contains`] but including the one-above-roof
    /// band swept by the repair pass.
    pub fn contains_in_sweep(&self, p: BlockPos) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y + 1
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Every (x, z) column covered by the footprint.
    pub fn columns(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let (zmin, zmax) = (self.min.z, self.max.z);
        (self.min.x..=self.max.x).flat_map(move |x| (zmin..=zmax).map(move |z| (x, z)))
    }

    /// Vertical range of the foreign-object sweep: full height plus one
    /// above the tallest cell.
    pub fn sweep_ys(&self) -> std::ops::RangeInclusive<i32> {
        self.min.y..=self.max.y + 1
    }
}

/// Immutable, normalized voxel plan.
///
/// Owned exclusively by one build job for its lifetime. All derived
/// structure (footprint, column roofs, implied extensions, material
/// tallies) is computed once here, never re-derived during passes.
#[derive(Debug, Clone)]
pub struct Blueprint {
    cells: Vec<Cell>,
    by_pos: AHashMap<BlockPos, MaterialId>,
    implied: AHashSet<BlockPos>,
    column_roofs: AHashMap<(i32, i32), i32>,
    footprint: Footprint,
    tallies: AHashMap<MaterialId, u32>,
}

impl Blueprint {
    /// Normalize a cell list into a blueprint.
    ///
    /// Rejects empty plans, duplicate coordinates, materials unknown to
    /// the catalog, and cells made of the scaffold material (the
    /// temporary support material must stay distinct from the structure
    /// so cleanup stays unambiguous). Cells are ordered bottom-up so a
    /// build pass visits lower layers before the layers they support.
    pub fn from_cells(mut cells: Vec<Cell>, catalog: &MaterialCatalog) -> Result<Self> {
        if cells.is_empty() {
            return Err(EngineError::LoadFailure("blueprint has no cells".into()));
        }

        cells.sort_by_key(|c| (c.pos.y, c.pos.z, c.pos.x));

        let mut by_pos = AHashMap::with_capacity(cells.len());
        let mut column_roofs: AHashMap<(i32, i32), i32> = AHashMap::new();
        let mut tallies: AHashMap<MaterialId, u32> = AHashMap::new();
        let mut min = cells[0].pos;
        let mut max = cells[0].pos;

        for cell in &cells {
            match catalog.kind_of(cell.material) {
                None => {
                    return Err(EngineError::LoadFailure(format!(
                        "cell at {:?} uses unknown material id {}",
                        cell.pos, cell.material.0
                    )));
                }
                Some(MaterialKind::Scaffold) => {
                    return Err(EngineError::LoadFailure(format!(
                        "cell at {:?} uses the scaffold material",
                        cell.pos
                    )));
                }
                Some(_) => {}
            }
            if by_pos.insert(cell.pos, cell.material).is_some() {
                return Err(EngineError::LoadFailure(format!(
                    "duplicate cell at {:?}",
                    cell.pos
                )));
            }
            let roof = column_roofs.entry((cell.pos.x, cell.pos.z)).or_insert(cell.pos.y);
            *roof = (*roof).max(cell.pos.y);
            *tallies.entry(cell.material).or_insert(0) += 1;
            min = min.min(cell.pos);
            max = max.max(cell.pos);
        }

        // Implied extensions (the upper half of two-tall materials) are
        // derived once here; scans later treat them as occupied-by-us.
        let mut implied = AHashSet::new();
        for cell in &cells {
            for offset in catalog.extra_cells(cell.material) {
                let pos = cell.pos + *offset;
                if !by_pos.contains_key(&pos) {
                    implied.insert(pos);
                }
            }
        }

        let footprint = Footprint {
            min: BlockPos::new(min.x - 1, min.y, min.z - 1),
            max: BlockPos::new(max.x + 1, max.y, max.z + 1),
        };

        Ok(Self {
            cells,
            by_pos,
            implied,
            column_roofs,
            footprint,
            tallies,
        })
    }

    /// Cells in build order (bottom-up).
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn material_at(&self, local: BlockPos) -> Option<MaterialId> {
        self.by_pos.get(&local).copied()
    }

    pub fn is_cell(&self, local: BlockPos) -> bool {
        self.by_pos.contains_key(&local)
    }

    /// Whether a local coordinate is an implicit extension of a
    /// recorded cell (never placed directly, never swept as foreign).
    pub fn is_implied(&self, local: BlockPos) -> bool {
        self.implied.contains(&local)
    }

    /// Exclusion height map lookup: the highest cell y in this column.
    pub fn roof_height(&self, x: i32, z: i32) -> Option<i32> {
        self.column_roofs.get(&(x, z)).copied()
    }

    /// Whether a local coordinate lies strictly below its column's
    /// roof. Scaffolds must never be placed there: beneath-roof space
    /// is structure interior and must stay clear for the structure's
    /// own blocks. The roof height itself is allowed.
    pub fn is_exclusion_interior(&self, local: BlockPos) -> bool {
        match self.roof_height(local.x, local.z) {
            Some(roof) => local.y < roof,
            None => false,
        }
    }

    pub fn footprint(&self) -> Footprint {
        self.footprint
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Required count per distinct material.
    pub fn material_tallies(&self) -> &AHashMap<MaterialId, u32> {
        &self.tallies
    }

    /// Human-readable overview for status output.
    pub fn summary(&self, catalog: &MaterialCatalog) -> BlueprintSummary {
        let span = self.footprint.max - self.footprint.min;
        let mut materials: Vec<(String, u32)> = self
            .tallies
            .iter()
            .map(|(&id, &count)| {
                let name = catalog.name_of(id).unwrap_or("<unknown>").to_string();
                (name, count)
            })
            .collect();
        materials.sort();
        BlueprintSummary {
            // Footprint is padded by one on each horizontal side.
            size: BlockPos::new(span.x - 1, span.y + 1, span.z - 1),
            cell_count: self.cells.len(),
            materials,
        }
    }
}

/// Size and material overview of a blueprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueprintSummary {
    pub size: BlockPos,
    pub cell_count: usize,
    pub materials: Vec<(String, u32)>,
}
