//! Core type definitions used throughout the codebase

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Integer block coordinate (blueprint-local or world, depending on context)
pub type BlockPos = glam::IVec3;

/// Unique identifier for build jobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

/// Dense index into a [`MaterialCatalog`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialId(pub u32);

/// Closed material-category set.
///
/// Built once from the external block data source instead of re-deriving
/// a category from name substrings at every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialKind {
    /// Ordinary one-cell solid block
    Block,
    /// Occupies its base cell plus the cell directly above (doors, tall plants)
    TwoTall,
    /// The temporary support material the engine may place and must remove
    Scaffold,
}

/// Registry of every material the engine can talk about.
///
/// Name and kind are resolved to a [`MaterialId`] once at catalog build
/// time; all engine-internal lookups are index-based after that.
#[derive(Debug, Clone, Default)]
pub struct MaterialCatalog {
    names: Vec<String>,
    kinds: Vec<MaterialKind>,
    by_name: AHashMap<String, MaterialId>,
}

impl MaterialCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a material, returning its id. Registering an existing
    /// name returns the existing id unchanged.
    pub fn register(&mut self, name: &str, kind: MaterialKind) -> MaterialId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = MaterialId(self.names.len() as u32);
        self.names.push(name.to_string());
        self.kinds.push(kind);
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub fn id_of(&self, name: &str) -> Option<MaterialId> {
        self.by_name.get(name).copied()
    }

    pub fn name_of(&self, id: MaterialId) -> Option<&str> {
        self.names.get(id.0 as usize).map(String::as_str)
    }

    pub fn kind_of(&self, id: MaterialId) -> Option<MaterialKind> {
        self.kinds.get(id.0 as usize).copied()
    }

    /// The designated scaffold material, if one was registered.
    pub fn scaffold(&self) -> Option<MaterialId> {
        self.kinds
            .iter()
            .position(|&k| k == MaterialKind::Scaffold)
            .map(|i| MaterialId(i as u32))
    }

    /// Implied extra cells occupied by a material beyond its base cell,
    /// as offsets from the base. Empty for ordinary blocks.
    pub fn extra_cells(&self, id: MaterialId) -> &'static [BlockPos] {
        const TWO_TALL_UPPER: [BlockPos; 1] = [BlockPos::new(0, 1, 0)];
        match self.kind_of(id) {
            Some(MaterialKind::TwoTall) => &TWO_TALL_UPPER,
            _ => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
