//! Script-based traversal strategy.
//!
//! Alternate strategy with the same observable contract as the native
//! walker: the bipartite pattern-match is delegated to the graph store's own
//! traversal-script facility, and the returned raw edges are fed through the
//! same relation assembler. Process compression is native-only; the script
//! response does not expose intermediate process identity in a form
//! convenient for compressing here.

use crate::context::LineageContext;
use crate::entity::EntityProjector;
use crate::error::Result;
use crate::graph::{Edge, EdgeLabel, GraphStore};
use crate::model::{LineageDirection, LineageGraph};
use crate::walker::{direction_labels, Assembler};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// The four lineage pattern templates understood by the store's query
/// facility: full (unbounded) or partial (depth-bounded), rooted at a
/// dataset or at a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptTemplate {
    FullLineageDataset,
    FullLineageProcess,
    PartialLineageDataset,
    PartialLineageProcess,
}

/// Parameter bindings for a lineage script execution.
///
/// The store's native recursion counts individual hops, not the engine's
/// dataset-to-dataset unit, so the depth bound is passed twice: once for
/// dataset-level recursion and once, reduced by the free first hop, for
/// process-rooted recursion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptBindings {
    /// Root vertex id.
    pub root_id: String,
    /// Label of edges entering the dataset being expanded.
    pub incoming_label: EdgeLabel,
    /// Label of edges leaving the mediating process.
    pub outgoing_label: EdgeLabel,
    /// Dataset-level recursion bound.
    pub dataset_depth: i32,
    /// Process-level recursion bound (`dataset_depth - 1`).
    pub process_depth: i32,
}

/// A parameterized lineage pattern-match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineageScript {
    pub template: ScriptTemplate,
    pub bindings: ScriptBindings,
}

impl LineageScript {
    /// Builds the script for one directional sub-walk of a request.
    pub(crate) fn for_context(context: &LineageContext, direction: LineageDirection) -> Self {
        let upstream = direction == LineageDirection::Input;
        let (incoming_label, outgoing_label) = direction_labels(upstream);

        let template = match (context.requested_depth < 1, context.is_dataset) {
            (true, true) => ScriptTemplate::FullLineageDataset,
            (true, false) => ScriptTemplate::FullLineageProcess,
            (false, true) => ScriptTemplate::PartialLineageDataset,
            (false, false) => ScriptTemplate::PartialLineageProcess,
        };

        Self {
            template,
            bindings: ScriptBindings {
                root_id: context.root_id.clone(),
                incoming_label,
                outgoing_label,
                dataset_depth: context.requested_depth as i32,
                process_depth: context.requested_depth as i32 - 1,
            },
        }
    }
}

/// One element of a script execution's raw response.
#[derive(Debug, Clone)]
pub enum ScriptValue {
    /// A graph edge matching the pattern.
    Edge(Edge),
    /// Anything else the script surfaced; logged and ignored.
    Other(serde_json::Value),
}

/// Runs one directional sub-walk through the script facility.
pub(crate) async fn run(
    store: &dyn GraphStore,
    projector: &dyn EntityProjector,
    context: &LineageContext,
    direction: LineageDirection,
) -> Result<LineageGraph> {
    let script = LineageScript::for_context(context, direction);
    let values = store.execute_lineage_script(&script).await?;

    let mut assembler = Assembler::new(store, projector, context);
    for value in values {
        match value {
            ScriptValue::Edge(edge) => {
                assembler.record_edge(&edge).await?;
            }
            ScriptValue::Other(other) => {
                warn!(value = %other, "Ignoring non-edge value in lineage script result");
            }
        }
    }

    Ok(assembler.into_graph(direction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::UNBOUNDED_DEPTH;
    use crate::graph::Vertex;

    fn context(depth: u32, is_dataset: bool) -> LineageContext {
        LineageContext {
            root_id: "root".into(),
            direction: LineageDirection::Input,
            requested_depth: depth,
            depth: if depth == 0 {
                UNBOUNDED_DEPTH
            } else {
                depth as i32
            },
            hide_process: false,
            attributes: Vec::new(),
            is_dataset,
            root_vertex: is_dataset.then(|| Vertex::new("root", "hive_table")),
        }
    }

    #[test]
    fn test_template_selection() {
        let script = LineageScript::for_context(&context(0, true), LineageDirection::Input);
        assert_eq!(script.template, ScriptTemplate::FullLineageDataset);

        let script = LineageScript::for_context(&context(0, false), LineageDirection::Input);
        assert_eq!(script.template, ScriptTemplate::FullLineageProcess);

        let script = LineageScript::for_context(&context(3, true), LineageDirection::Output);
        assert_eq!(script.template, ScriptTemplate::PartialLineageDataset);

        let script = LineageScript::for_context(&context(3, false), LineageDirection::Output);
        assert_eq!(script.template, ScriptTemplate::PartialLineageProcess);
    }

    #[test]
    fn test_depth_bindings() {
        let script = LineageScript::for_context(&context(3, true), LineageDirection::Input);
        assert_eq!(script.bindings.dataset_depth, 3);
        assert_eq!(script.bindings.process_depth, 2);
    }

    #[test]
    fn test_direction_label_bindings() {
        let upstream = LineageScript::for_context(&context(2, true), LineageDirection::Input);
        assert_eq!(upstream.bindings.incoming_label, EdgeLabel::ProcessOutputs);
        assert_eq!(upstream.bindings.outgoing_label, EdgeLabel::ProcessInputs);

        let downstream = LineageScript::for_context(&context(2, true), LineageDirection::Output);
        assert_eq!(downstream.bindings.incoming_label, EdgeLabel::ProcessInputs);
        assert_eq!(downstream.bindings.outgoing_label, EdgeLabel::ProcessOutputs);
    }
}
