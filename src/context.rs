//! Lineage request and the immutable per-request traversal context.

use crate::graph::Vertex;
use crate::model::LineageDirection;
use serde::{Deserialize, Serialize};

/// Sentinel for an unbounded depth budget. Decrementing it never reaches
/// the loop-termination value, so termination rests on the visited set and
/// the finiteness of the graph.
pub(crate) const UNBOUNDED_DEPTH: i32 = -1;

/// A caller's lineage request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineageRequest {
    /// Id of the entity to resolve lineage for.
    pub root_id: String,
    /// Traversal direction.
    pub direction: LineageDirection,
    /// Depth bound in dataset-to-dataset hops; 0 means unbounded.
    pub depth: u32,
    /// Collapse process vertices into direct dataset-to-dataset relations.
    #[serde(default)]
    pub hide_process: bool,
    /// Attributes to project onto every materialized entity.
    #[serde(default)]
    pub attributes: Vec<String>,
}

impl LineageRequest {
    /// Creates a request with process vertices shown and no attributes.
    pub fn new(root_id: impl Into<String>, direction: LineageDirection, depth: u32) -> Self {
        Self {
            root_id: root_id.into(),
            direction,
            depth,
            hide_process: false,
            attributes: Vec::new(),
        }
    }

    /// Enables or disables process-vertex compression.
    pub fn with_hide_process(mut self, hide_process: bool) -> Self {
        self.hide_process = hide_process;
        self
    }

    /// Sets the attributes to project.
    pub fn with_attributes(mut self, attributes: Vec<String>) -> Self {
        self.attributes = attributes;
        self
    }
}

/// Immutable per-request traversal configuration, built by the request
/// normalizer and read-only for the rest of the request.
#[derive(Debug, Clone)]
pub struct LineageContext {
    /// Root entity id.
    pub root_id: String,
    /// Requested direction.
    pub direction: LineageDirection,
    /// Depth bound after clamping; reported back on the result.
    pub requested_depth: u32,
    /// Normalized depth budget: `requested_depth`, or [`UNBOUNDED_DEPTH`]
    /// when the requested bound was 0.
    pub(crate) depth: i32,
    /// Compression mode.
    pub hide_process: bool,
    /// Attributes to project.
    pub attributes: Vec<String>,
    /// Root classifies as dataset-like; a process root is the only other
    /// possibility past normalization.
    pub is_dataset: bool,
    /// The root vertex, kept for dataset roots only: the compression rule
    /// treats the root as implicitly visible to itself.
    pub root_vertex: Option<Vertex>,
}

impl LineageContext {
    /// Tests whether a vertex id is the traversal's dataset root.
    pub fn is_root(&self, vertex_id: &str) -> bool {
        self.root_vertex
            .as_ref()
            .map(|v| v.id == vertex_id)
            .unwrap_or(false)
    }
}
