//! Common test utilities for lineage integration tests.

use meridian::{
    AllowAll, CatalogProjector, EdgeLabel, LineageConfig, LineageService, MemoryGraphStore,
    TypeDef, TypeRegistry, Vertex, DATASET_SUPER_TYPE, PROCESS_SUPER_TYPE,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the log subscriber so traversal output surfaces under
/// `RUST_LOG`. Later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_test_writer())
        .try_init();
}

/// A populated store, a projector, and the relationship ids minted for the
/// fixture's edges, keyed as `"process->dataset"`.
pub struct Fixture {
    pub store: Arc<MemoryGraphStore>,
    pub projector: Arc<CatalogProjector>,
    pub relationship_ids: HashMap<String, String>,
}

impl Fixture {
    pub fn service(&self) -> LineageService {
        self.service_with(LineageConfig::default())
    }

    pub fn service_with(&self, config: LineageConfig) -> LineageService {
        LineageService::new(
            self.store.clone(),
            self.projector.clone(),
            Arc::new(AllowAll),
            config,
        )
        .expect("valid config")
    }

    /// Relationship id of the fixture edge `process->dataset`.
    pub fn rel(&self, key: &str) -> Option<String> {
        self.relationship_ids.get(key).cloned()
    }
}

pub fn type_registry() -> TypeRegistry {
    TypeRegistry::new(vec![
        TypeDef::new("Referenceable", &[]),
        TypeDef::new("Asset", &["Referenceable"]),
        TypeDef::new(DATASET_SUPER_TYPE, &["Asset"]),
        TypeDef::new(PROCESS_SUPER_TYPE, &["Asset"]),
        TypeDef::new("hive_table", &[DATASET_SUPER_TYPE]),
        TypeDef::new("etl_job", &[PROCESS_SUPER_TYPE]),
        TypeDef::new("hive_db", &["Asset"]),
    ])
}

async fn build(
    datasets: &[&str],
    processes: &[&str],
    edges: &[(&str, &str, EdgeLabel)],
) -> Fixture {
    init_tracing();

    let store = Arc::new(MemoryGraphStore::new(type_registry()));

    for id in datasets {
        store
            .add_vertex(Vertex::new(*id, "hive_table"))
            .await
            .expect("add dataset");
    }
    for id in processes {
        store
            .add_vertex(Vertex::new(*id, "etl_job"))
            .await
            .expect("add process");
    }

    let mut relationship_ids = HashMap::new();
    for (process, dataset, label) in edges {
        let id = store.link(process, dataset, *label).await.expect("link");
        relationship_ids.insert(format!("{}->{}", process, dataset), id);
    }

    Fixture {
        store,
        projector: Arc::new(CatalogProjector::new()),
        relationship_ids,
    }
}

/// `a <- p1 <- b <- p2 <- c`: a's upstream chain. p1 produces a from b,
/// p2 produces b from c.
pub async fn upstream_chain() -> Fixture {
    build(
        &["a", "b", "c"],
        &["p1", "p2"],
        &[
            ("p1", "a", EdgeLabel::ProcessOutputs),
            ("p1", "b", EdgeLabel::ProcessInputs),
            ("p2", "b", EdgeLabel::ProcessOutputs),
            ("p2", "c", EdgeLabel::ProcessInputs),
        ],
    )
    .await
}

/// Process `p1` consuming `x` and `y` and producing `z`.
pub async fn process_hub() -> Fixture {
    build(
        &["x", "y", "z"],
        &["p1"],
        &[
            ("p1", "x", EdgeLabel::ProcessInputs),
            ("p1", "y", EdgeLabel::ProcessInputs),
            ("p1", "z", EdgeLabel::ProcessOutputs),
        ],
    )
    .await
}

/// `a <- p1 <- b` and `b <- p2 <- a`: a two-dataset cycle.
pub async fn two_dataset_cycle() -> Fixture {
    build(
        &["a", "b"],
        &["p1", "p2"],
        &[
            ("p1", "a", EdgeLabel::ProcessOutputs),
            ("p1", "b", EdgeLabel::ProcessInputs),
            ("p2", "b", EdgeLabel::ProcessOutputs),
            ("p2", "a", EdgeLabel::ProcessInputs),
        ],
    )
    .await
}
