// Graph access port for lineage traversal

pub mod memory;

pub use memory::MemoryGraphStore;

use crate::error::Result;
use crate::script::{LineageScript, ScriptValue};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A vertex in the provenance graph.
///
/// Classification (dataset-like vs process-like) is derived from
/// `type_name` through the type registry, never stored on the vertex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    /// Unique vertex id.
    pub id: String,
    /// Entity type name.
    pub type_name: String,
}

impl Vertex {
    /// Creates a vertex.
    pub fn new(id: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_name: type_name.into(),
        }
    }
}

/// Edge label in the bipartite dataset/process graph.
///
/// Both labels run from a process vertex (tail) to a dataset vertex (head);
/// there is never a direct dataset-to-dataset edge in the store. All
/// dataset-to-dataset relationships are mediated by a process vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeLabel {
    /// The process consumes the dataset as input.
    ProcessInputs,
    /// The process produces the dataset as output.
    ProcessOutputs,
}

/// Direction of edge lookup relative to a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDirection {
    /// Edges whose head is the vertex.
    In,
    /// Edges whose tail is the vertex.
    Out,
}

/// A directed, labeled edge from a process vertex to a dataset vertex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Edge label.
    pub label: EdgeLabel,
    /// Relationship identifier, if the store tracks one for this edge.
    pub relationship_id: Option<String>,
    /// Tail vertex id (the process).
    pub from: String,
    /// Head vertex id (the dataset).
    pub to: String,
}

impl Edge {
    /// Creates an edge without a relationship id.
    pub fn new(label: EdgeLabel, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            label,
            relationship_id: None,
            from: from.into(),
            to: to.into(),
        }
    }

    /// Sets the relationship id.
    pub fn with_relationship_id(mut self, id: impl Into<String>) -> Self {
        self.relationship_id = Some(id.into());
        self
    }
}

/// Contract for vertex/edge lookup against the backing graph store.
///
/// Implementations must be safe for concurrent read-only use across
/// simultaneously executing traversals.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Looks up a vertex by id.
    async fn find_vertex(&self, id: &str) -> Option<Vertex>;

    /// Edges incident to `vertex_id` in the given direction with the given
    /// label. Each call returns a finite snapshot.
    async fn edges(&self, vertex_id: &str, direction: EdgeDirection, label: EdgeLabel)
        -> Vec<Edge>;

    /// Tests whether `type_name` transitively extends the marker supertype.
    fn is_of_category(&self, type_name: &str, marker: &str) -> bool;

    /// Executes a lineage pattern-match using the store's own traversal
    /// query facility. Used by the script-based strategy only.
    async fn execute_lineage_script(&self, script: &LineageScript) -> Result<Vec<ScriptValue>>;
}
