//! Static candidate-behavior lists per policy key.

use arrayvec::ArrayVec;
use strum::EnumCount;
use thiserror::Error;

use super::behavior::GroupBehavior;
use super::key::PolicyKey;
use crate::error::{DirectorError, ErrorSeverity};

type Behaviors = ArrayVec<GroupBehavior, { GroupBehavior::COUNT }>;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CandidateTableError {
    #[error("policy key {key} listed more than once")]
    DuplicateKey { key: PolicyKey },

    #[error("policy key {key} has no candidate behaviors")]
    EmptyBehaviors { key: PolicyKey },
}

impl DirectorError for CandidateTableError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateKey { .. } => "CANDIDATES_DUPLICATE_KEY",
            Self::EmptyBehaviors { .. } => "CANDIDATES_EMPTY_BEHAVIORS",
        }
    }
}

/// Lookup table from [`PolicyKey`] to the behaviors allowed in that context.
///
/// Stored densely by [`PolicyKey::index`]; keys absent from the table return
/// `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateTable {
    entries: Vec<Option<Behaviors>>,
}

impl CandidateTable {
    pub fn builder() -> CandidateTableBuilder {
        CandidateTableBuilder::new()
    }

    /// Table with no keys; every lookup falls through to the default behavior.
    pub fn empty() -> Self {
        Self {
            entries: vec![None; PolicyKey::COUNT],
        }
    }

    pub fn get(&self, key: PolicyKey) -> Option<&[GroupBehavior]> {
        self.entries
            .get(key.index())
            .and_then(|entry| entry.as_deref())
    }

    pub fn contains(&self, key: PolicyKey) -> bool {
        self.get(key).is_some()
    }

    /// Number of populated keys.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CandidateTable {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Clone, Debug, Default)]
pub struct CandidateTableBuilder {
    rows: Vec<(PolicyKey, Vec<GroupBehavior>)>,
}

impl CandidateTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(mut self, key: PolicyKey, behaviors: &[GroupBehavior]) -> Self {
        self.rows.push((key, behaviors.to_vec()));
        self
    }

    pub fn push(&mut self, key: PolicyKey, behaviors: Vec<GroupBehavior>) {
        self.rows.push((key, behaviors));
    }

    /// Builds the table. Repeated behaviors within one row collapse to one.
    pub fn build(self) -> Result<CandidateTable, CandidateTableError> {
        let mut table = CandidateTable::empty();
        for (key, behaviors) in self.rows {
            if behaviors.is_empty() {
                return Err(CandidateTableError::EmptyBehaviors { key });
            }
            let slot = &mut table.entries[key.index()];
            if slot.is_some() {
                return Err(CandidateTableError::DuplicateKey { key });
            }

            let mut unique = Behaviors::new();
            for behavior in behaviors {
                if !unique.contains(&behavior) {
                    unique.push(behavior);
                }
            }
            *slot = Some(unique);
        }
        Ok(table)
    }
}
