//! In-memory [`RegistryVectorStore`].
//!
//! Both indexes sit behind one `parking_lot::RwLock`. Search is brute-force
//! cosine similarity over every stored vector (see [`crate::search`]).
//!
//! `add_registry` embeds everything *before* taking the write lock, then
//! swaps the route's old entries for the new ones under a single write
//! guard. A failed embedding therefore leaves the store untouched, and a
//! concurrent reader sees either the old set or the new set, never a mix.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::embedding::{HashingVectorizer, Vectorizer};
use crate::error::{RegistryError, Result};
use crate::models::RouteRegistry;
use crate::search::{rank_top_k, SearchHit};

use super::{action_owner_id, component_owner_id, SourceRef, VectorEntry};

#[derive(Default)]
struct Indexes {
    components: Vec<VectorEntry>,
    routes: Vec<VectorEntry>,
}

/// Similarity index over component, action, and route summaries.
///
/// Constructed once by the caller and shared by reference (or `Arc`);
/// there is no process-wide instance.
pub struct RegistryVectorStore {
    vectorizer: Arc<dyn Vectorizer>,
    indexes: RwLock<Indexes>,
}

impl RegistryVectorStore {
    pub fn new(vectorizer: Arc<dyn Vectorizer>) -> Self {
        Self {
            vectorizer,
            indexes: RwLock::new(Indexes::default()),
        }
    }

    /// Store backed by the default [`HashingVectorizer`].
    pub fn with_hashing() -> Self {
        Self::new(Arc::new(HashingVectorizer::default()))
    }

    pub fn dims(&self) -> usize {
        self.vectorizer.dims()
    }

    pub fn model_id(&self) -> &str {
        self.vectorizer.model_id()
    }

    /// Number of component-level entries (components plus actions).
    pub fn component_count(&self) -> usize {
        self.indexes.read().components.len()
    }

    /// True until the first registry is added. A route with no components
    /// still counts.
    pub fn is_empty(&self) -> bool {
        self.indexes.read().routes.is_empty()
    }

    pub fn route_count(&self) -> usize {
        self.indexes.read().routes.len()
    }

    /// Indexed route ids, in insertion order.
    pub fn routes(&self) -> Vec<String> {
        self.indexes
            .read()
            .routes
            .iter()
            .map(|e| e.source.route().to_string())
            .collect()
    }

    /// Number of component-level entries owned by `route`.
    pub fn entries_for_route(&self, route: &str) -> usize {
        self.indexes
            .read()
            .components
            .iter()
            .filter(|e| e.source.route() == route)
            .count()
    }

    /// Index a registry, replacing any entries previously added for the
    /// same route.
    ///
    /// Returns the number of component-level entries inserted.
    ///
    /// # Errors
    ///
    /// An embedding failure aborts the insertion; the store keeps its
    /// prior state for that route.
    pub fn add_registry(&self, registry: &RouteRegistry) -> Result<usize> {
        let route = registry.route.as_str();
        let mut fresh = Vec::with_capacity(registry.components.len() + registry.actions.len());

        for (i, component) in registry.components.iter().enumerate() {
            fresh.push(VectorEntry {
                owner_id: component_owner_id(route, i),
                vector: self.embed_checked(&component.textual_summary)?,
                source: SourceRef::Component {
                    route: route.to_string(),
                    index: i,
                    name: component.name.clone(),
                },
                summary: component.textual_summary.clone(),
            });
        }

        for (i, action) in registry.actions.iter().enumerate() {
            fresh.push(VectorEntry {
                owner_id: action_owner_id(route, i),
                vector: self.embed_checked(&action.textual_summary)?,
                source: SourceRef::Action {
                    route: route.to_string(),
                    index: i,
                    name: action.name.clone(),
                    kind: action.kind,
                },
                summary: action.textual_summary.clone(),
            });
        }

        let route_text = route_summary(registry);
        let route_entry = VectorEntry {
            owner_id: route.to_string(),
            vector: self.embed_checked(&route_text)?,
            source: SourceRef::Route {
                route: route.to_string(),
            },
            summary: route_text,
        };

        let inserted = fresh.len();
        {
            let mut guard = self.indexes.write();
            guard.components.retain(|e| e.source.route() != route);
            guard.routes.retain(|e| e.source.route() != route);
            guard.components.extend(fresh);
            guard.routes.push(route_entry);
        }

        debug!(route, inserted, "indexed registry");
        Ok(inserted)
    }

    /// Rank components and actions against a free-text query.
    pub fn find_similar_components(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        if top_k == 0 || self.indexes.read().components.is_empty() {
            return Ok(Vec::new());
        }
        let query_vec = self.embed_checked(query)?;
        self.find_similar_components_by_vector(&query_vec, top_k)
    }

    /// Rank routes against a free-text query.
    pub fn find_similar_routes(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        if top_k == 0 || self.indexes.read().routes.is_empty() {
            return Ok(Vec::new());
        }
        let query_vec = self.embed_checked(query)?;
        self.find_similar_routes_by_vector(&query_vec, top_k)
    }

    /// Rank components and actions against a precomputed query vector.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Usage`] if `query` does not have the store's
    /// dimensionality.
    pub fn find_similar_components_by_vector(
        &self,
        query: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchHit>> {
        self.check_query_dims(query)?;
        let guard = self.indexes.read();
        rank_top_k(query, &guard.components, top_k)
    }

    /// Rank routes against a precomputed query vector.
    pub fn find_similar_routes_by_vector(
        &self,
        query: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchHit>> {
        self.check_query_dims(query)?;
        let guard = self.indexes.read();
        rank_top_k(query, &guard.routes, top_k)
    }

    fn check_query_dims(&self, query: &[f32]) -> Result<()> {
        let expected = self.vectorizer.dims();
        if query.len() != expected {
            return Err(RegistryError::Usage {
                expected,
                actual: query.len(),
            });
        }
        Ok(())
    }

    fn embed_checked(&self, text: &str) -> Result<Vec<f32>> {
        let vector = self.vectorizer.embed(text)?;
        if vector.len() != self.vectorizer.dims() {
            return Err(RegistryError::embedding(
                self.vectorizer.model_id(),
                format!(
                    "returned {} dims, expected {}",
                    vector.len(),
                    self.vectorizer.dims()
                ),
            ));
        }
        Ok(vector)
    }
}

/// Route-level embedding input: the route id followed by every summary,
/// concatenated.
fn route_summary(registry: &RouteRegistry) -> String {
    let mut parts = vec![format!("Route {}", display_route(&registry.route))];
    parts.extend(registry.summaries().map(str::to_string));
    parts.join(". ")
}

fn display_route(route: &str) -> &str {
    if route.is_empty() {
        "/"
    } else {
        route
    }
}
