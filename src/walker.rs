//! Native traversal engine and relation assembler.
//!
//! The engine walks the bipartite dataset/process graph from the traversal
//! root, one direction per run, using an explicit worklist owned by the
//! invocation. Every dataset pair discovered through a mediating process is
//! handed to the [`Assembler`], which applies the visibility rules, dedup,
//! and the hide-process compression before anything lands in the result.
//!
//! Cycle handling: a vertex already expanded is never expanded again, but it
//! may still appear as an endpoint of further relations discovered from other
//! paths. The walk produces a bounded reachability set, not a spanning
//! structure.

use crate::context::{LineageContext, UNBOUNDED_DEPTH};
use crate::entity::{EntityProjector, EntitySummary};
use crate::error::{MeridianError, Result};
use crate::graph::{Edge, EdgeDirection, EdgeLabel, GraphStore, Vertex};
use crate::model::{LineageDirection, LineageGraph, LineageRelation};
use crate::typedef::PROCESS_SUPER_TYPE;
use std::collections::{HashMap, HashSet};

/// Edge labels consulted when expanding a dataset vertex, as
/// `(incoming, outgoing)`: the label of edges entering the dataset (finding
/// mediating processes) and the label of edges leaving those processes
/// (finding the far datasets).
pub(crate) fn direction_labels(upstream: bool) -> (EdgeLabel, EdgeLabel) {
    if upstream {
        (EdgeLabel::ProcessOutputs, EdgeLabel::ProcessInputs)
    } else {
        (EdgeLabel::ProcessInputs, EdgeLabel::ProcessOutputs)
    }
}

/// Remaining budget after one dataset-to-dataset hop.
pub(crate) fn next_depth(depth: i32) -> i32 {
    if depth == UNBOUNDED_DEPTH {
        depth
    } else {
        depth - 1
    }
}

/// Accumulates traversed edges into result relations and projected entities.
///
/// One assembler lives per directional sub-walk; its accumulators are owned
/// by that invocation and never shared across requests.
pub(crate) struct Assembler<'a> {
    store: &'a dyn GraphStore,
    projector: &'a dyn EntityProjector,
    context: &'a LineageContext,
    entities: HashMap<String, EntitySummary>,
    relations: HashSet<LineageRelation>,
}

impl<'a> Assembler<'a> {
    pub(crate) fn new(
        store: &'a dyn GraphStore,
        projector: &'a dyn EntityProjector,
        context: &'a LineageContext,
    ) -> Self {
        Self {
            store,
            projector,
            context,
            entities: HashMap::new(),
            relations: HashSet::new(),
        }
    }

    /// Finalizes the accumulators into a lineage graph.
    pub(crate) fn into_graph(self, direction: LineageDirection) -> LineageGraph {
        LineageGraph {
            root_id: self.context.root_id.clone(),
            entities: self.entities,
            relations: self.relations,
            direction,
            depth: self.context.requested_depth,
        }
    }

    /// Tests whether a relation with this relationship id was recorded.
    pub(crate) fn contains_relationship(&self, relationship_id: &str) -> bool {
        self.relations
            .iter()
            .any(|r| r.relationship_id.as_deref() == Some(relationship_id))
    }

    /// Records a `(incoming, outgoing)` pair of process edges, in whichever
    /// mode the request selected. Returns true when the pair was skipped by
    /// the visibility rules.
    pub(crate) async fn record_pair(&mut self, incoming: &Edge, outgoing: &Edge) -> Result<bool> {
        if self.context.hide_process {
            self.record_pair_compressed(incoming, outgoing).await
        } else {
            self.record_pair_expanded(incoming, outgoing).await
        }
    }

    /// Expanded mode: both edges of the pair become separate relations,
    /// oriented in the data-flow direction, and the process is materialized
    /// like any other endpoint.
    ///
    /// The pair is admitted when both dataset endpoints pass the visibility
    /// predicate, or when the near endpoint is the traversal root (already
    /// vetted by the one-time authorization check) and the far endpoint
    /// passes.
    async fn record_pair_expanded(&mut self, incoming: &Edge, outgoing: &Edge) -> Result<bool> {
        let near = self.vertex(&incoming.to).await?;
        let far = self.vertex(&outgoing.to).await?;

        if !self.pair_admitted(&near, &far).await {
            return Ok(true);
        }

        let process = self.vertex(&incoming.from).await?;

        self.materialize(&near).await?;
        self.materialize(&process).await?;
        self.materialize(&far).await?;

        self.relations.insert(flow_relation(
            incoming.label,
            &process.id,
            &near.id,
            incoming.relationship_id.clone(),
        ));
        self.relations.insert(flow_relation(
            outgoing.label,
            &process.id,
            &far.id,
            outgoing.relationship_id.clone(),
        ));

        Ok(false)
    }

    /// Compressed mode: the process is never materialized; the pair becomes
    /// one dataset-to-dataset relation carrying the process id as
    /// provenance. Same admission rule as expanded mode.
    async fn record_pair_compressed(&mut self, incoming: &Edge, outgoing: &Edge) -> Result<bool> {
        let near = self.vertex(&incoming.to).await?;
        let far = self.vertex(&outgoing.to).await?;

        if !self.pair_admitted(&near, &far).await {
            return Ok(true);
        }

        self.materialize(&near).await?;
        self.materialize(&far).await?;

        let process_id = outgoing.from.clone();
        let relation = match incoming.label {
            // Downstream walk: the near dataset feeds the process.
            EdgeLabel::ProcessInputs => LineageRelation::compressed(&near.id, &far.id, process_id),
            // Upstream walk: the far dataset feeds the process.
            EdgeLabel::ProcessOutputs => LineageRelation::compressed(&far.id, &near.id, process_id),
        };
        self.relations.insert(relation);

        Ok(false)
    }

    /// Records a single process edge: the process-root first hop and every
    /// script-result edge come through here. Admitted when at least one
    /// endpoint is a non-process vertex passing the visibility predicate.
    pub(crate) async fn record_edge(&mut self, edge: &Edge) -> Result<bool> {
        let head = self.vertex(&edge.to).await?;
        let tail = self.vertex(&edge.from).await?;

        let head_admits = !self.is_process(&head.type_name) && self.projector.visible(&head).await;
        let tail_admits = !self.is_process(&tail.type_name) && self.projector.visible(&tail).await;

        if !head_admits && !tail_admits {
            return Ok(true);
        }

        self.materialize(&head).await?;
        self.materialize(&tail).await?;

        self.relations.insert(flow_relation(
            edge.label,
            &tail.id,
            &head.id,
            edge.relationship_id.clone(),
        ));

        Ok(false)
    }

    async fn pair_admitted(&self, near: &Vertex, far: &Vertex) -> bool {
        (self.context.is_root(&near.id) && self.projector.visible(far).await)
            || (self.projector.visible(near).await && self.projector.visible(far).await)
    }

    /// Materializes a vertex into the entity map exactly once; subsequent
    /// appearances are a lookup, not a re-projection.
    async fn materialize(&mut self, vertex: &Vertex) -> Result<()> {
        if !self.entities.contains_key(&vertex.id) {
            let summary = self
                .projector
                .project(vertex, &self.context.attributes)
                .await?;
            self.entities.insert(vertex.id.clone(), summary);
        }
        Ok(())
    }

    async fn vertex(&self, id: &str) -> Result<Vertex> {
        self.store.find_vertex(id).await.ok_or_else(|| {
            MeridianError::TraversalBackendFailure(format!(
                "edge references missing vertex {}",
                id
            ))
        })
    }

    fn is_process(&self, type_name: &str) -> bool {
        self.store.is_of_category(type_name, PROCESS_SUPER_TYPE)
    }
}

/// Flow-oriented relation for one process edge: consumption points into the
/// process, production points out of it, independent of which direction the
/// traversal walked.
fn flow_relation(
    label: EdgeLabel,
    process_id: &str,
    dataset_id: &str,
    relationship_id: Option<String>,
) -> LineageRelation {
    match label {
        EdgeLabel::ProcessInputs => LineageRelation::new(dataset_id, process_id, relationship_id),
        EdgeLabel::ProcessOutputs => LineageRelation::new(process_id, dataset_id, relationship_id),
    }
}

/// Runs one directional sub-walk natively. `direction` must be `Input` or
/// `Output`; the aggregator handles `Both` by merging two runs.
pub(crate) async fn run(
    store: &dyn GraphStore,
    projector: &dyn EntityProjector,
    context: &LineageContext,
    direction: LineageDirection,
) -> Result<LineageGraph> {
    let upstream = direction == LineageDirection::Input;
    let mut assembler = Assembler::new(store, projector, context);

    if context.is_dataset {
        expand(&mut assembler, store, &context.root_id, context.depth, upstream).await?;
    } else {
        // Process root: one direct hop to the adjacent datasets, recorded
        // outside the depth budget, then dataset expansion with depth - 1.
        let hop_label = if upstream {
            EdgeLabel::ProcessInputs
        } else {
            EdgeLabel::ProcessOutputs
        };

        for edge in store
            .edges(&context.root_id, EdgeDirection::Out, hop_label)
            .await
        {
            let duplicate = edge
                .relationship_id
                .as_deref()
                .map(|id| assembler.contains_relationship(id))
                .unwrap_or(false);
            if !duplicate {
                assembler.record_edge(&edge).await?;
            }

            expand(
                &mut assembler,
                store,
                &edge.to,
                next_depth(context.depth),
                upstream,
            )
            .await?;
        }
    }

    Ok(assembler.into_graph(direction))
}

/// Depth-first expansion from one dataset vertex, with a visited set scoped
/// to this call.
async fn expand(
    assembler: &mut Assembler<'_>,
    store: &dyn GraphStore,
    root: &str,
    depth: i32,
    upstream: bool,
) -> Result<()> {
    let (incoming_label, outgoing_label) = direction_labels(upstream);

    let mut visited: HashSet<String> = HashSet::new();
    let mut worklist: Vec<(String, i32)> = vec![(root.to_string(), depth)];

    while let Some((vertex_id, remaining)) = worklist.pop() {
        if remaining == 0 || !visited.insert(vertex_id.clone()) {
            continue;
        }

        for incoming in store
            .edges(&vertex_id, EdgeDirection::In, incoming_label)
            .await
        {
            for outgoing in store
                .edges(&incoming.from, EdgeDirection::Out, outgoing_label)
                .await
            {
                let far_id = outgoing.to.clone();
                let skipped = assembler.record_pair(&incoming, &outgoing).await?;

                if !skipped && !visited.contains(&far_id) {
                    worklist.push((far_id, next_depth(remaining)));
                }
            }
        }
    }

    Ok(())
}
