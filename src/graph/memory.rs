// In-memory graph store

use crate::context::UNBOUNDED_DEPTH;
use crate::error::{MeridianError, Result};
use crate::graph::{Edge, EdgeDirection, EdgeLabel, GraphStore, Vertex};
use crate::script::{LineageScript, ScriptBindings, ScriptTemplate, ScriptValue};
use crate::typedef::TypeRegistry;
use crate::walker::next_depth;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// In-memory implementation of the graph access port.
///
/// Vertices and edges live in maps guarded for concurrent read-only
/// traversal; incoming/outgoing adjacency indexes keep edge lookup cheap.
/// Edges without a caller-supplied relationship id get a generated one.
pub struct MemoryGraphStore {
    types: TypeRegistry,
    /// Vertices by id.
    vertices: RwLock<HashMap<String, Vertex>>,
    /// Edges by relationship id.
    edges: RwLock<HashMap<String, Edge>>,
    /// Outgoing edges: tail vertex id -> relationship ids.
    outgoing: RwLock<HashMap<String, Vec<String>>>,
    /// Incoming edges: head vertex id -> relationship ids.
    incoming: RwLock<HashMap<String, Vec<String>>>,
}

impl MemoryGraphStore {
    /// Creates an empty store over the given type registry.
    pub fn new(types: TypeRegistry) -> Self {
        Self {
            types,
            vertices: RwLock::new(HashMap::new()),
            edges: RwLock::new(HashMap::new()),
            outgoing: RwLock::new(HashMap::new()),
            incoming: RwLock::new(HashMap::new()),
        }
    }

    /// Adds a vertex.
    pub async fn add_vertex(&self, vertex: Vertex) -> Result<()> {
        let mut vertices = self.vertices.write().await;
        vertices.insert(vertex.id.clone(), vertex);
        Ok(())
    }

    /// Adds an edge, minting a relationship id when the edge carries none.
    /// Both endpoints must exist. Returns the relationship id.
    pub async fn add_edge(&self, mut edge: Edge) -> Result<String> {
        {
            let vertices = self.vertices.read().await;
            if !vertices.contains_key(&edge.from) {
                return Err(MeridianError::EntityNotFound(edge.from));
            }
            if !vertices.contains_key(&edge.to) {
                return Err(MeridianError::EntityNotFound(edge.to));
            }
        }

        let relationship_id = edge
            .relationship_id
            .get_or_insert_with(|| uuid::Uuid::new_v4().to_string())
            .clone();

        let from = edge.from.clone();
        let to = edge.to.clone();

        {
            let mut edges = self.edges.write().await;
            edges.insert(relationship_id.clone(), edge);
        }
        {
            let mut outgoing = self.outgoing.write().await;
            outgoing.entry(from).or_default().push(relationship_id.clone());
        }
        {
            let mut incoming = self.incoming.write().await;
            incoming.entry(to).or_default().push(relationship_id.clone());
        }

        Ok(relationship_id)
    }

    /// Connects a process to a dataset with the given label.
    pub async fn link(
        &self,
        process_id: &str,
        dataset_id: &str,
        label: EdgeLabel,
    ) -> Result<String> {
        self.add_edge(Edge::new(label, process_id, dataset_id)).await
    }

    /// Number of vertices.
    pub async fn vertex_count(&self) -> usize {
        self.vertices.read().await.len()
    }

    /// Number of edges.
    pub async fn edge_count(&self) -> usize {
        self.edges.read().await.len()
    }

    /// Emits every edge on dataset-to-dataset paths from `root`, bounded by
    /// `depth` dataset hops. This is the store-side interpretation of the
    /// dataset-rooted lineage pattern.
    async fn emit_dataset_walk(
        &self,
        root: &str,
        depth: i32,
        bindings: &ScriptBindings,
        out: &mut Vec<ScriptValue>,
    ) {
        let mut visited: HashSet<String> = HashSet::new();
        let mut worklist: Vec<(String, i32)> = vec![(root.to_string(), depth)];

        while let Some((vertex_id, remaining)) = worklist.pop() {
            if remaining == 0 || !visited.insert(vertex_id.clone()) {
                continue;
            }

            for incoming in self
                .edges(&vertex_id, EdgeDirection::In, bindings.incoming_label)
                .await
            {
                out.push(ScriptValue::Edge(incoming.clone()));

                for outgoing in self
                    .edges(&incoming.from, EdgeDirection::Out, bindings.outgoing_label)
                    .await
                {
                    let far_id = outgoing.to.clone();
                    out.push(ScriptValue::Edge(outgoing));

                    if !visited.contains(&far_id) {
                        worklist.push((far_id, next_depth(remaining)));
                    }
                }
            }
        }
    }

    async fn edges_by_ids(&self, ids: Option<&Vec<String>>, label: EdgeLabel) -> Vec<Edge> {
        let Some(ids) = ids else {
            return Vec::new();
        };

        let edges = self.edges.read().await;
        ids.iter()
            .filter_map(|id| edges.get(id))
            .filter(|e| e.label == label)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn find_vertex(&self, id: &str) -> Option<Vertex> {
        self.vertices.read().await.get(id).cloned()
    }

    async fn edges(
        &self,
        vertex_id: &str,
        direction: EdgeDirection,
        label: EdgeLabel,
    ) -> Vec<Edge> {
        // Copy the id list out so the index guard is released before the
        // edges-map lock is taken.
        let ids = match direction {
            EdgeDirection::Out => self.outgoing.read().await.get(vertex_id).cloned(),
            EdgeDirection::In => self.incoming.read().await.get(vertex_id).cloned(),
        };
        self.edges_by_ids(ids.as_ref(), label).await
    }

    fn is_of_category(&self, type_name: &str, marker: &str) -> bool {
        self.types.is_of_category(type_name, marker)
    }

    async fn execute_lineage_script(&self, script: &LineageScript) -> Result<Vec<ScriptValue>> {
        let bindings = &script.bindings;
        let mut out = Vec::new();

        match script.template {
            ScriptTemplate::FullLineageDataset => {
                self.emit_dataset_walk(&bindings.root_id, UNBOUNDED_DEPTH, bindings, &mut out)
                    .await;
            }
            ScriptTemplate::PartialLineageDataset => {
                self.emit_dataset_walk(&bindings.root_id, bindings.dataset_depth, bindings, &mut out)
                    .await;
            }
            ScriptTemplate::FullLineageProcess | ScriptTemplate::PartialLineageProcess => {
                let depth = if script.template == ScriptTemplate::FullLineageProcess {
                    UNBOUNDED_DEPTH
                } else {
                    bindings.process_depth
                };

                let hops = self
                    .edges(&bindings.root_id, EdgeDirection::Out, bindings.outgoing_label)
                    .await;
                for hop in hops {
                    let dataset_id = hop.to.clone();
                    out.push(ScriptValue::Edge(hop));
                    self.emit_dataset_walk(&dataset_id, depth, bindings, &mut out)
                        .await;
                }
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typedef::{TypeDef, DATASET_SUPER_TYPE, PROCESS_SUPER_TYPE};

    fn registry() -> TypeRegistry {
        TypeRegistry::new(vec![
            TypeDef::new(DATASET_SUPER_TYPE, &[]),
            TypeDef::new(PROCESS_SUPER_TYPE, &[]),
            TypeDef::new("hive_table", &[DATASET_SUPER_TYPE]),
            TypeDef::new("etl_job", &[PROCESS_SUPER_TYPE]),
        ])
    }

    async fn store() -> MemoryGraphStore {
        let store = MemoryGraphStore::new(registry());
        store
            .add_vertex(Vertex::new("a", "hive_table"))
            .await
            .unwrap();
        store
            .add_vertex(Vertex::new("b", "hive_table"))
            .await
            .unwrap();
        store
            .add_vertex(Vertex::new("p1", "etl_job"))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_adjacency_lookup() {
        let store = store().await;
        store.link("p1", "a", EdgeLabel::ProcessOutputs).await.unwrap();
        store.link("p1", "b", EdgeLabel::ProcessInputs).await.unwrap();

        let produced = store.edges("a", EdgeDirection::In, EdgeLabel::ProcessOutputs).await;
        assert_eq!(produced.len(), 1);
        assert_eq!(produced[0].from, "p1");

        let consumed = store.edges("p1", EdgeDirection::Out, EdgeLabel::ProcessInputs).await;
        assert_eq!(consumed.len(), 1);
        assert_eq!(consumed[0].to, "b");

        // Label filter applies.
        assert!(store
            .edges("a", EdgeDirection::In, EdgeLabel::ProcessInputs)
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn test_add_edge_requires_endpoints() {
        let store = store().await;
        let err = store
            .add_edge(Edge::new(EdgeLabel::ProcessOutputs, "p1", "missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, MeridianError::EntityNotFound(_)));
    }

    #[tokio::test]
    async fn test_relationship_ids_are_minted() {
        let store = store().await;
        let id = store.link("p1", "a", EdgeLabel::ProcessOutputs).await.unwrap();
        assert!(!id.is_empty());

        let kept = store
            .add_edge(
                Edge::new(EdgeLabel::ProcessInputs, "p1", "b").with_relationship_id("rel-7"),
            )
            .await
            .unwrap();
        assert_eq!(kept, "rel-7");
        assert_eq!(store.edge_count().await, 2);
    }

    #[tokio::test]
    async fn test_script_emits_pattern_edges() {
        let store = store().await;
        store.link("p1", "a", EdgeLabel::ProcessOutputs).await.unwrap();
        store.link("p1", "b", EdgeLabel::ProcessInputs).await.unwrap();

        // Upstream pattern from a: the producing edge and the consumed edge.
        let script = LineageScript {
            template: ScriptTemplate::FullLineageDataset,
            bindings: ScriptBindings {
                root_id: "a".into(),
                incoming_label: EdgeLabel::ProcessOutputs,
                outgoing_label: EdgeLabel::ProcessInputs,
                dataset_depth: 0,
                process_depth: -1,
            },
        };

        let values = store.execute_lineage_script(&script).await.unwrap();
        let edges: Vec<Edge> = values
            .into_iter()
            .map(|v| match v {
                ScriptValue::Edge(e) => e,
                ScriptValue::Other(_) => panic!("unexpected non-edge value"),
            })
            .collect();

        assert_eq!(edges.len(), 2);
        assert!(edges.iter().any(|e| e.label == EdgeLabel::ProcessOutputs && e.to == "a"));
        assert!(edges.iter().any(|e| e.label == EdgeLabel::ProcessInputs && e.to == "b"));
    }
}
