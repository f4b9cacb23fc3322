//! Registry data models.
//!
//! A [`RouteRegistry`] is the unit of persistence: one per route, written
//! as a JSON artifact by the scanner and read back by the loader. Field
//! names serialize in camelCase so artifacts stay readable by tooling on
//! the application side.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Artifact schema version written into every registry.
pub const REGISTRY_VERSION: u32 = 1;

/// Statically inferred type of a prop or parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    String,
    Number,
    Boolean,
    Unknown,
}

impl TypeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::String => "string",
            TypeTag::Number => "number",
            TypeTag::Boolean => "boolean",
            TypeTag::Unknown => "unknown",
        }
    }

    /// Combine two observations of the same prop. Disagreement widens to
    /// [`TypeTag::Unknown`].
    pub fn merge(self, other: TypeTag) -> TypeTag {
        if self == other {
            self
        } else {
            TypeTag::Unknown
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a component's first call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Entry file path, relative to the app directory.
    pub file: String,
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub column: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A statically referenced renderable unit with its inferred prop shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UIComponent {
    pub name: String,
    /// Module specifier the component symbol was imported from.
    pub import_source: String,
    pub props_signature: BTreeMap<String, TypeTag>,
    pub source_location: SourceLocation,
    /// Static text children, whitespace-collapsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    /// Static `href` destination, for link-like components.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
    /// Static `role` / `aria-*` attribute values.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub accessibility: BTreeMap<String, String>,
    /// Event handler props (`onClick`, `onSubmit`, ...), in first-seen order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<String>,
    pub textual_summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Query,
    Mutation,
    Handler,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Query => "query",
            ActionKind::Mutation => "mutation",
            ActionKind::Handler => "handler",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeTag,
}

/// A named query, mutation, or handler exposed by a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDescriptor {
    pub name: String,
    pub kind: ActionKind,
    pub parameters: Vec<Parameter>,
    /// Where the action was found: an import specifier for imported
    /// operations, the entry file otherwise.
    pub source: String,
    pub textual_summary: String,
}

/// Extracted metadata for one route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRegistry {
    pub route: String,
    /// Entry file path, relative to the app directory.
    pub entry_file: String,
    pub components: Vec<UIComponent>,
    pub actions: Vec<ActionDescriptor>,
    #[serde(with = "iso8601")]
    pub scanned_at: DateTime<Utc>,
    #[serde(default = "default_version")]
    pub version: u32,
}

fn default_version() -> u32 {
    REGISTRY_VERSION
}

impl RouteRegistry {
    /// Every summary in the registry, components first, in stored order.
    pub fn summaries(&self) -> impl Iterator<Item = &str> {
        self.components
            .iter()
            .map(|c| c.textual_summary.as_str())
            .chain(self.actions.iter().map(|a| a.textual_summary.as_str()))
    }

    /// Equality ignoring `scanned_at`.
    pub fn same_content(&self, other: &RouteRegistry) -> bool {
        self.route == other.route
            && self.entry_file == other.entry_file
            && self.components == other.components
            && self.actions == other.actions
    }
}

mod iso8601 {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
