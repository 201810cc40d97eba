//! Entity type definitions and supertype classification.
//!
//! Lineage traversal only needs one question answered about a type: does it
//! transitively extend the dataset or the process supertype. Rather than
//! walking the supertype hierarchy on every visited vertex, the registry
//! computes the full ancestor closure of every type once, when type metadata
//! loads, and answers category checks with a plain set lookup.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Marker supertype for dataset-like entities (tables, files, topics).
pub const DATASET_SUPER_TYPE: &str = "DataSet";

/// Marker supertype for process-like entities (ETL jobs, queries) that
/// connect input datasets to output datasets.
pub const PROCESS_SUPER_TYPE: &str = "Process";

/// A named entity type and its direct supertypes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDef {
    /// Type name.
    pub name: String,
    /// Direct supertype names.
    pub super_types: Vec<String>,
}

impl TypeDef {
    /// Creates a type definition.
    pub fn new(name: impl Into<String>, super_types: &[&str]) -> Self {
        Self {
            name: name.into(),
            super_types: super_types.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Registry of entity types with precomputed ancestor closures.
///
/// A type's closure contains the type itself plus every transitive
/// supertype, so `is_of_category("hive_table", DATASET_SUPER_TYPE)` is a
/// single set-membership test at traversal time.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    ancestors: HashMap<String, HashSet<String>>,
}

impl TypeRegistry {
    /// Builds the registry, computing the ancestor closure of every type.
    ///
    /// Unknown supertype names are treated as leaf marker types. Cycles in
    /// the declared hierarchy do not loop; each type is resolved once.
    pub fn new(defs: Vec<TypeDef>) -> Self {
        let direct: HashMap<String, Vec<String>> = defs
            .into_iter()
            .map(|d| (d.name, d.super_types))
            .collect();

        let mut ancestors: HashMap<String, HashSet<String>> = HashMap::new();
        for name in direct.keys() {
            let mut closure = HashSet::new();
            let mut pending = vec![name.clone()];
            while let Some(current) = pending.pop() {
                if !closure.insert(current.clone()) {
                    continue;
                }
                if let Some(supers) = direct.get(&current) {
                    pending.extend(supers.iter().cloned());
                }
            }
            ancestors.insert(name.clone(), closure);
        }

        Self { ancestors }
    }

    /// Tests whether `type_name` transitively extends the given marker type.
    ///
    /// Unknown type names belong to no category.
    pub fn is_of_category(&self, type_name: &str, marker: &str) -> bool {
        self.ancestors
            .get(type_name)
            .map(|closure| closure.contains(marker))
            .unwrap_or(false)
    }

    /// The full ancestor closure of a type, if registered.
    pub fn ancestors(&self, type_name: &str) -> Option<&HashSet<String>> {
        self.ancestors.get(type_name)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.ancestors.len()
    }

    /// True when no types are registered.
    pub fn is_empty(&self) -> bool {
        self.ancestors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TypeRegistry {
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

    #[test]
    fn test_transitive_closure() {
        let registry = registry();
        let closure = registry.ancestors("hive_table").unwrap();
        assert!(closure.contains("hive_table"));
        assert!(closure.contains(DATASET_SUPER_TYPE));
        assert!(closure.contains("Asset"));
        assert!(closure.contains("Referenceable"));
        assert!(!closure.contains(PROCESS_SUPER_TYPE));
    }

    #[test]
    fn test_category_membership() {
        let registry = registry();
        assert!(registry.is_of_category("hive_table", DATASET_SUPER_TYPE));
        assert!(registry.is_of_category("etl_job", PROCESS_SUPER_TYPE));
        assert!(!registry.is_of_category("hive_table", PROCESS_SUPER_TYPE));
        assert!(!registry.is_of_category("hive_db", DATASET_SUPER_TYPE));
        assert!(!registry.is_of_category("unknown_type", DATASET_SUPER_TYPE));
    }

    #[test]
    fn test_marker_type_is_its_own_category() {
        let registry = registry();
        assert!(registry.is_of_category(DATASET_SUPER_TYPE, DATASET_SUPER_TYPE));
    }

    #[test]
    fn test_cyclic_hierarchy_terminates() {
        let registry = TypeRegistry::new(vec![
            TypeDef::new("a", &["b"]),
            TypeDef::new("b", &["a", DATASET_SUPER_TYPE]),
            TypeDef::new(DATASET_SUPER_TYPE, &[]),
        ]);
        assert!(registry.is_of_category("a", DATASET_SUPER_TYPE));
        assert!(registry.is_of_category("b", DATASET_SUPER_TYPE));
    }
}
