//! Meridian - a metadata catalog's lineage resolution engine.
//!
//! Given the id of a dataset- or process-like entity, Meridian reconstructs
//! the directed provenance graph (what produced it, what it produced) up to
//! a caller-specified depth, optionally collapsing intermediate process
//! vertices into direct dataset-to-dataset relations, and filtering the
//! result through an externally supplied visibility predicate.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Meridian                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Service: request normalizer | strategy dispatch | merge    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Strategies: native walker + assembler | script adapter     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Collaborators: graph store | entity projector | authorizer │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The underlying graph is bipartite: a process vertex connects to the
//! datasets it reads via `consumes-input` edges and to the datasets it
//! writes via `produces-output` edges; there is never a direct
//! dataset-to-dataset edge. Persistence of that graph, REST packaging,
//! and access-policy evaluation live outside this crate, behind the
//! [`GraphStore`], [`EntityProjector`], and [`Authorizer`] traits.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use meridian::{
//!     AllowAll, CatalogProjector, LineageConfig, LineageDirection, LineageRequest,
//!     LineageService, MemoryGraphStore, TypeRegistry,
//! };
//!
//! #[tokio::main]
//! async fn main() -> meridian::Result<()> {
//!     let store = Arc::new(MemoryGraphStore::new(TypeRegistry::default()));
//!     let service = LineageService::new(
//!         store,
//!         Arc::new(CatalogProjector::new()),
//!         Arc::new(AllowAll),
//!         LineageConfig::default(),
//!     )?;
//!
//!     let lineage = service
//!         .resolve_lineage(LineageRequest::new("t1", LineageDirection::Both, 3))
//!         .await?;
//!     println!("{} entities", lineage.entities.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod context;
pub mod entity;
pub mod error;
pub mod graph;
pub mod model;
pub mod script;
pub mod service;
pub mod typedef;

mod walker;

// Re-exports
pub use config::{LineageConfig, TraversalStrategy};
pub use context::{LineageContext, LineageRequest};
pub use entity::{AccessAction, AllowAll, Authorizer, CatalogProjector, EntityProjector, EntitySummary};
pub use error::{MeridianError, Result};
pub use graph::{Edge, EdgeDirection, EdgeLabel, GraphStore, MemoryGraphStore, Vertex};
pub use model::{LineageDirection, LineageGraph, LineageRelation};
pub use script::{LineageScript, ScriptBindings, ScriptTemplate, ScriptValue};
pub use service::LineageService;
pub use typedef::{TypeDef, TypeRegistry, DATASET_SUPER_TYPE, PROCESS_SUPER_TYPE};
