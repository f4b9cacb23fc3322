//! Action extraction.
//!
//! Three sources, merged in source order and de-duplicated by name:
//!
//! - exported functions of the entry file (request handlers, server
//!   actions, data loaders);
//! - locally declared `handle*` event handlers;
//! - imported GraphQL operation constants, resolved by reading the module
//!   they are imported from.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tree_sitter::Node;

use route_registry_core::models::{ActionDescriptor, ActionKind, Parameter, TypeTag};
use route_registry_core::{RegistryError, Result};

use super::imports::{BindingKind, ImportTable, ModuleResolver};
use super::summary::action_summary;
use super::syntax::{
    collapse_ws, has_token, infer_expression, infer_type, parse_source, string_contents, text,
    walk_preorder,
};

const HTTP_VERBS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];
const READ_VERBS: &[&str] = &["get", "fetch", "list", "find", "load", "search", "query", "read"];
/// Next.js page and layout hooks; the framework calls these, users do not.
const FRAMEWORK_EXPORTS: &[&str] = &[
    "generateMetadata",
    "generateStaticParams",
    "generateViewport",
    "generateImageMetadata",
    "generateSitemaps",
];

pub struct ActionContext<'a> {
    pub code: &'a str,
    /// Entry file path relative to the app directory.
    pub file: &'a str,
    /// Directory holding the entry file, for relative imports.
    pub entry_dir: &'a Path,
    pub imports: &'a ImportTable,
    pub resolver: &'a ModuleResolver,
}

struct Found {
    offset: usize,
    action: ActionDescriptor,
}

pub fn extract_actions(ctx: &ActionContext, root: Node) -> Vec<ActionDescriptor> {
    let mut found = local_actions(ctx, root);
    found.extend(graphql_actions(ctx));
    found.sort_by_key(|f| f.offset);

    let mut seen = HashSet::new();
    found
        .into_iter()
        .filter(|f| seen.insert(f.action.name.clone()))
        .map(|f| {
            let mut action = f.action;
            action.textual_summary = action_summary(&action);
            action
        })
        .collect()
}

/// Classify an exported function by its name.
pub fn classify_export(name: &str) -> ActionKind {
    if HTTP_VERBS.contains(&name) || has_word_prefix(name, "handle") || has_word_prefix(name, "on") {
        ActionKind::Handler
    } else if READ_VERBS.iter().any(|verb| has_word_prefix(name, verb)) {
        ActionKind::Query
    } else {
        ActionKind::Mutation
    }
}

/// `prefix` followed by the end of the name or a new word (`getUser`,
/// `get_user`), so `generate` does not count as `get`.
fn has_word_prefix(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(|c: char| c.is_ascii_uppercase() || c == '_'))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Export {
    None,
    Named,
    Default,
}

struct FnDef {
    name: String,
    offset: usize,
    parameters: Vec<Parameter>,
    export: Export,
}

fn local_actions(ctx: &ActionContext, root: Node) -> Vec<Found> {
    let mut defs = Vec::new();
    walk_preorder(root, |node| {
        if let Some(def) = function_def(ctx.code, node) {
            defs.push(def);
        }
    });
    let clause = export_clause_names(ctx.code, root);

    defs.into_iter()
        .filter_map(|def| {
            let (name, kind) = match def.export {
                Export::Default => return None,
                Export::Named if FRAMEWORK_EXPORTS.contains(&def.name.as_str()) => return None,
                Export::Named => (def.name.clone(), classify_export(&def.name)),
                Export::None => match clause.get(&def.name) {
                    Some(exported) if exported == "default" || FRAMEWORK_EXPORTS.contains(&exported.as_str()) => {
                        return None
                    }
                    Some(exported) => (exported.clone(), classify_export(exported)),
                    None if has_word_prefix(&def.name, "handle") => (def.name.clone(), ActionKind::Handler),
                    None => return None,
                },
            };
            Some(Found {
                offset: def.offset,
                action: ActionDescriptor {
                    name,
                    kind,
                    parameters: def.parameters,
                    source: ctx.file.to_string(),
                    textual_summary: String::new(),
                },
            })
        })
        .collect()
}

fn function_def(code: &str, node: Node) -> Option<FnDef> {
    let (name, function, statement) = match node.kind() {
        "function_declaration" | "generator_function_declaration" => {
            (node.child_by_field_name("name")?, node, node.parent())
        }
        "variable_declarator" => {
            let value = node.child_by_field_name("value")?;
            if !matches!(value.kind(), "arrow_function" | "function_expression" | "function") {
                return None;
            }
            let name = node.child_by_field_name("name")?;
            if name.kind() != "identifier" {
                return None;
            }
            (name, value, node.parent().and_then(|decl| decl.parent()))
        }
        _ => return None,
    };

    let export = match statement {
        Some(stmt) if stmt.kind() == "export_statement" => {
            if has_token(stmt, "default") {
                Export::Default
            } else {
                Export::Named
            }
        }
        _ => Export::None,
    };

    Some(FnDef {
        name: text(code, name).to_string(),
        offset: node.start_byte(),
        parameters: function_parameters(code, function),
        export,
    })
}

fn function_parameters(code: &str, function: Node) -> Vec<Parameter> {
    if let Some(single) = function.child_by_field_name("parameter") {
        return vec![Parameter {
            name: text(code, single).to_string(),
            ty: TypeTag::Unknown,
        }];
    }
    let Some(params) = function.child_by_field_name("parameters") else {
        return Vec::new();
    };

    let mut cursor = params.walk();
    let mut out = Vec::new();
    for param in params.named_children(&mut cursor) {
        match param.kind() {
            "required_parameter" | "optional_parameter" => {
                let Some(pattern) = param.child_by_field_name("pattern") else {
                    continue;
                };
                let ty = match (param.child_by_field_name("type"), param.child_by_field_name("value")) {
                    (Some(t), _) => infer_type(code, t),
                    (None, Some(v)) => infer_expression(code, v),
                    (None, None) => TypeTag::Unknown,
                };
                out.push(Parameter {
                    name: collapse_ws(text(code, pattern)),
                    ty,
                });
            }
            "identifier" => out.push(Parameter {
                name: text(code, param).to_string(),
                ty: TypeTag::Unknown,
            }),
            "assignment_pattern" => {
                if let Some(left) = param.child_by_field_name("left") {
                    let ty = param
                        .child_by_field_name("right")
                        .map(|v| infer_expression(code, v))
                        .unwrap_or(TypeTag::Unknown);
                    out.push(Parameter {
                        name: collapse_ws(text(code, left)),
                        ty,
                    });
                }
            }
            _ => {}
        }
    }
    out
}

/// Local name → exported name for `export { a, b as c }` statements
/// without a `from` clause.
fn export_clause_names(code: &str, program: Node) -> HashMap<String, String> {
    let mut names = HashMap::new();
    let mut cursor = program.walk();
    for stmt in program.named_children(&mut cursor) {
        if stmt.kind() != "export_statement" || stmt.child_by_field_name("source").is_some() {
            continue;
        }
        let mut stmt_cursor = stmt.walk();
        for clause in stmt.named_children(&mut stmt_cursor) {
            if clause.kind() != "export_clause" {
                continue;
            }
            let mut spec_cursor = clause.walk();
            for spec in clause.named_children(&mut spec_cursor) {
                let Some(local) = spec.child_by_field_name("name") else {
                    continue;
                };
                let local = text(code, local).to_string();
                let exported = spec
                    .child_by_field_name("alias")
                    .map(|a| text(code, a).to_string())
                    .unwrap_or_else(|| local.clone());
                names.insert(local, exported);
            }
        }
    }
    names
}

/// A parsed GraphQL operation document header.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphqlOperation {
    pub name: Option<String>,
    pub kind: ActionKind,
    pub parameters: Vec<Parameter>,
}

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(query|mutation|subscription)\b\s*([A-Za-z_]\w*)?\s*(\(([^)]*)\))?")
            .expect("valid operation header pattern")
    })
}

fn variable_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$(\w+)\s*:\s*\[?\s*(\w+)").expect("valid variable pattern"))
}

/// Parse the header of a GraphQL document (`mutation Like($id: uuid!)`).
/// `subscription` is reported as a query.
pub fn parse_operation(document: &str) -> Option<GraphqlOperation> {
    let caps = header_re().captures(document)?;
    let kind = match &caps[1] {
        "mutation" => ActionKind::Mutation,
        _ => ActionKind::Query,
    };
    let parameters = caps
        .get(4)
        .map(|vars| {
            variable_re()
                .captures_iter(vars.as_str())
                .map(|v| Parameter {
                    name: v[1].to_string(),
                    ty: graphql_type(&v[2]),
                })
                .collect()
        })
        .unwrap_or_default();

    Some(GraphqlOperation {
        name: caps.get(2).map(|m| m.as_str().to_string()),
        kind,
        parameters,
    })
}

fn graphql_type(name: &str) -> TypeTag {
    match name.to_ascii_lowercase().as_str() {
        "string" | "id" | "uuid" | "timestamptz" | "timestamp" | "date" | "citext" | "text" => {
            TypeTag::String
        }
        "int" | "float" | "numeric" | "bigint" | "smallint" => TypeTag::Number,
        "boolean" | "bool" => TypeTag::Boolean,
        _ => TypeTag::Unknown,
    }
}

fn graphql_actions(ctx: &ActionContext) -> Vec<Found> {
    let mut modules: HashMap<PathBuf, HashMap<String, GraphqlOperation>> = HashMap::new();
    let mut out = Vec::new();

    for binding in ctx.imports.iter() {
        if binding.kind != BindingKind::Named || binding.type_only || !ctx.resolver.is_local(&binding.source) {
            continue;
        }
        let Some(path) = ctx.resolver.resolve(ctx.entry_dir, &binding.source) else {
            tracing::debug!(
                file = ctx.file,
                module = %binding.source,
                "skipping import from unresolvable module"
            );
            continue;
        };

        let operations = modules.entry(path.clone()).or_insert_with(|| {
            module_operations(&path).unwrap_or_else(|err| {
                tracing::debug!(file = ctx.file, error = %err, "skipping unreadable module");
                HashMap::new()
            })
        });

        let Some(imported) = binding.imported.as_deref() else {
            continue;
        };
        let Some(op) = operations.get(imported) else {
            continue;
        };

        out.push(Found {
            offset: binding.offset,
            action: ActionDescriptor {
                name: op.name.clone().unwrap_or_else(|| imported.to_string()),
                kind: op.kind,
                parameters: op.parameters.clone(),
                source: binding.source.clone(),
                textual_summary: String::new(),
            },
        });
    }
    out
}

/// Exported GraphQL operation constants of a module, keyed by export name.
pub fn module_operations(path: &Path) -> Result<HashMap<String, GraphqlOperation>> {
    let code = std::fs::read_to_string(path).map_err(|e| RegistryError::io(path, e))?;
    let tree = parse_source(path, &code)?;
    let program = tree.root_node();

    let mut consts: HashMap<String, GraphqlOperation> = HashMap::new();
    let mut exported: HashMap<String, String> = export_clause_names(&code, program)
        .into_iter()
        .map(|(local, name)| (name, local))
        .collect();

    let mut cursor = program.walk();
    for stmt in program.named_children(&mut cursor) {
        let (decl, is_export) = match stmt.kind() {
            "export_statement" => match stmt.child_by_field_name("declaration") {
                Some(decl) => (decl, true),
                None => continue,
            },
            "lexical_declaration" => (stmt, false),
            _ => continue,
        };
        if decl.kind() != "lexical_declaration" {
            continue;
        }
        let mut decl_cursor = decl.walk();
        for declarator in decl.named_children(&mut decl_cursor) {
            let (Some(name), Some(value)) = (
                declarator.child_by_field_name("name"),
                declarator.child_by_field_name("value"),
            ) else {
                continue;
            };
            let Some(op) = document_text(&code, value).and_then(|doc| parse_operation(&doc)) else {
                continue;
            };
            let name = text(&code, name).to_string();
            if is_export {
                exported.insert(name.clone(), name.clone());
            }
            consts.insert(name, op);
        }
    }

    Ok(exported
        .into_iter()
        .filter_map(|(export, local)| consts.get(&local).map(|op| (export, op.clone())))
        .collect())
}

/// Raw text of a GraphQL document literal: a plain string/template or a
/// `gql`/`graphql` tagged template.
fn document_text(code: &str, value: Node) -> Option<String> {
    match value.kind() {
        "template_string" | "string" => Some(string_contents(code, value)),
        "call_expression" => {
            let tag = text(code, value.child_by_field_name("function")?);
            let template = value.child_by_field_name("arguments")?;
            let tagged = matches!(tag, "gql" | "graphql") || tag.ends_with(".gql");
            (tagged && template.kind() == "template_string").then(|| string_contents(code, template))
        }
        _ => None,
    }
}
