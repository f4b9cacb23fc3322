//! Vector index entries and the in-memory registry store.
//!
//! The store keeps two indexes:
//!
//! | Index | One entry per | Owner id |
//! |-------|---------------|----------|
//! | component-level | component and action | `route#c<i>` / `route#a<i>` |
//! | route-level | registry | `route` |
//!
//! See [`RegistryVectorStore`] for the replace-on-route contract.

pub mod memory;

use serde::Serialize;

use crate::models::ActionKind;

pub use memory::RegistryVectorStore;

/// Back-reference from an indexed vector to the registry item it embeds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceRef {
    Component {
        route: String,
        index: usize,
        name: String,
    },
    Action {
        route: String,
        index: usize,
        name: String,
        kind: ActionKind,
    },
    Route {
        route: String,
    },
}

impl SourceRef {
    pub fn route(&self) -> &str {
        match self {
            SourceRef::Component { route, .. }
            | SourceRef::Action { route, .. }
            | SourceRef::Route { route } => route,
        }
    }

    /// Component or action name; the route id for route-level entries.
    pub fn label(&self) -> &str {
        match self {
            SourceRef::Component { name, .. } | SourceRef::Action { name, .. } => name,
            SourceRef::Route { route } => route,
        }
    }
}

/// One embedded item. Vectors in a store all share the store's
/// dimensionality and are L2-normalized (or zero for empty text).
#[derive(Debug, Clone)]
pub struct VectorEntry {
    pub owner_id: String,
    pub vector: Vec<f32>,
    pub source: SourceRef,
    pub summary: String,
}

pub fn component_owner_id(route: &str, index: usize) -> String {
    format!("{}#c{}", route, index)
}

pub fn action_owner_id(route: &str, index: usize) -> String {
    format!("{}#a{}", route, index)
}
