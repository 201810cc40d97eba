//! Lineage result model.

use crate::entity::EntitySummary;
use crate::error::{MeridianError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Direction of a lineage traversal relative to the root entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LineageDirection {
    /// What produced the root (upstream).
    Input,
    /// What the root produced (downstream).
    Output,
    /// Both, as the union of two independent sub-walks.
    Both,
}

/// A directed relation between two entities in a lineage result.
///
/// Relations form a set: uniqueness is the full tuple, including the
/// relationship id and, for compressed relations, the id of the process the
/// relation was compressed through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineageRelation {
    /// Source entity id.
    pub from_id: String,
    /// Target entity id.
    pub to_id: String,
    /// Relationship identifier, when the store tracks one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship_id: Option<String>,
    /// Id of the process this relation was compressed through. Only set in
    /// hide-process mode; the process itself is not materialized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_id: Option<String>,
}

impl LineageRelation {
    /// Creates an expanded-mode relation.
    pub fn new(
        from_id: impl Into<String>,
        to_id: impl Into<String>,
        relationship_id: Option<String>,
    ) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
            relationship_id,
            process_id: None,
        }
    }

    /// Creates a compressed dataset-to-dataset relation carrying the id of
    /// the hidden process as provenance.
    pub fn compressed(
        from_id: impl Into<String>,
        to_id: impl Into<String>,
        process_id: impl Into<String>,
    ) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
            relationship_id: None,
            process_id: Some(process_id.into()),
        }
    }
}

/// Result of a lineage traversal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineageGraph {
    /// Id of the traversal root.
    pub root_id: String,
    /// Projected summaries of every entity referenced by a relation.
    pub entities: HashMap<String, EntitySummary>,
    /// Discovered relations.
    pub relations: HashSet<LineageRelation>,
    /// Direction that produced this result.
    pub direction: LineageDirection,
    /// Depth bound used (0 means unbounded).
    pub depth: u32,
}

impl LineageGraph {
    /// Creates an empty result.
    pub fn new(root_id: impl Into<String>, direction: LineageDirection, depth: u32) -> Self {
        Self {
            root_id: root_id.into(),
            entities: HashMap::new(),
            relations: HashSet::new(),
            direction,
            depth,
        }
    }

    /// Tests whether any recorded relation carries this relationship id.
    pub fn contains_relationship(&self, relationship_id: &str) -> bool {
        self.relations
            .iter()
            .any(|r| r.relationship_id.as_deref() == Some(relationship_id))
    }

    /// Merges another result into this one.
    ///
    /// Entity maps are unioned with the other side overwriting on id
    /// collision (both sides project the same id equivalently), relation
    /// sets are unioned.
    pub fn merge(&mut self, other: LineageGraph) {
        self.entities.extend(other.entities);
        self.relations.extend(other.relations);
    }

    /// Verifies that every relation endpoint is present in the entity map.
    ///
    /// The `process_id` carried by compressed relations is provenance
    /// metadata, not an endpoint, and is exempt.
    pub fn check_references(&self) -> Result<()> {
        for relation in &self.relations {
            for endpoint in [&relation.from_id, &relation.to_id] {
                if !self.entities.contains_key(endpoint) {
                    return Err(MeridianError::Internal(format!(
                        "lineage relation references unmaterialized entity {}",
                        endpoint
                    )));
                }
            }
        }
        Ok(())
    }
}
