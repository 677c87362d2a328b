//! Candidate-behavior matrix loader.

use std::path::Path;

use director_core::{
    CandidateTable, GroupBehavior, InventoryProfile, MovementStyle, Playstyle, PolicyKey,
    TimePhase,
};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

const EMBEDDED_BEHAVIORS: &str = include_str!("../../data/behaviors.ron");

/// One row of the behavior matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorEntry {
    pub phase: TimePhase,
    pub playstyle: Playstyle,
    pub movement: MovementStyle,
    pub inventory: InventoryProfile,
    pub behaviors: Vec<GroupBehavior>,
}

impl BehaviorEntry {
    pub fn key(&self) -> PolicyKey {
        PolicyKey::new(self.phase, self.playstyle, self.movement, self.inventory)
    }
}

/// Behavior matrix structure for RON files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BehaviorMatrix {
    pub entries: Vec<BehaviorEntry>,
}

/// Loader for the candidate-behavior table.
pub struct BehaviorTableLoader;

impl BehaviorTableLoader {
    /// The matrix shipped with the crate, covering every policy key.
    pub fn embedded() -> LoadResult<CandidateTable> {
        Self::parse(EMBEDDED_BEHAVIORS)
    }

    /// Load a behavior matrix from a RON file.
    pub fn load(path: &Path) -> LoadResult<CandidateTable> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse a behavior matrix from RON text and build the lookup table.
    pub fn parse(content: &str) -> LoadResult<CandidateTable> {
        let matrix: BehaviorMatrix = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse behavior matrix RON: {}", e))?;

        let mut builder = CandidateTable::builder();
        for entry in matrix.entries {
            let key = entry.key();
            builder.push(key, entry.behaviors);
        }
        let table = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Invalid behavior matrix: {}", e))?;

        Ok(table)
    }
}
