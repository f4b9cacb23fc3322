//! Import bindings of an entry file and resolution of local module
//! specifiers (`./x`, `../x`, `@/x`) to files on disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tree_sitter::Node;

use super::syntax::{has_token, string_contents, text};

const EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Default,
    Named,
    Namespace,
}

#[derive(Debug, Clone)]
pub struct ImportBinding {
    /// Name the binding has inside the importing file.
    pub local: String,
    /// Exported name in the source module (named imports only).
    pub imported: Option<String>,
    pub source: String,
    pub kind: BindingKind,
    pub type_only: bool,
    /// Byte offset of the import statement.
    pub offset: usize,
}

#[derive(Debug, Default)]
pub struct ImportTable {
    bindings: Vec<ImportBinding>,
    by_local: HashMap<String, usize>,
}

impl ImportTable {
    pub fn get(&self, local: &str) -> Option<&ImportBinding> {
        self.by_local.get(local).map(|&i| &self.bindings[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImportBinding> {
        self.bindings.iter()
    }

    fn push(&mut self, binding: ImportBinding) {
        self.by_local
            .entry(binding.local.clone())
            .or_insert(self.bindings.len());
        self.bindings.push(binding);
    }
}

/// Collect the top-level `import` statements of a program.
pub fn collect_imports(code: &str, program: Node) -> ImportTable {
    let mut table = ImportTable::default();
    let mut cursor = program.walk();
    for stmt in program.named_children(&mut cursor) {
        if stmt.kind() != "import_statement" {
            continue;
        }
        let Some(source) = stmt.child_by_field_name("source") else {
            continue;
        };
        let source = string_contents(code, source);
        let type_only = has_token(stmt, "type");
        let offset = stmt.start_byte();

        let mut stmt_cursor = stmt.walk();
        for clause in stmt.named_children(&mut stmt_cursor) {
            if clause.kind() != "import_clause" {
                continue;
            }
            let mut clause_cursor = clause.walk();
            for part in clause.named_children(&mut clause_cursor) {
                match part.kind() {
                    "identifier" => table.push(ImportBinding {
                        local: text(code, part).to_string(),
                        imported: None,
                        source: source.clone(),
                        kind: BindingKind::Default,
                        type_only,
                        offset,
                    }),
                    "namespace_import" => {
                        if let Some(id) = part.named_child(0) {
                            table.push(ImportBinding {
                                local: text(code, id).to_string(),
                                imported: None,
                                source: source.clone(),
                                kind: BindingKind::Namespace,
                                type_only,
                                offset,
                            });
                        }
                    }
                    "named_imports" => {
                        let mut spec_cursor = part.walk();
                        for spec in part.named_children(&mut spec_cursor) {
                            if spec.kind() != "import_specifier" {
                                continue;
                            }
                            let Some(name) = spec.child_by_field_name("name") else {
                                continue;
                            };
                            let imported = string_contents(code, name);
                            let local = spec
                                .child_by_field_name("alias")
                                .map(|a| text(code, a).to_string())
                                .unwrap_or_else(|| imported.clone());
                            table.push(ImportBinding {
                                local,
                                imported: Some(imported),
                                source: source.clone(),
                                kind: BindingKind::Named,
                                type_only: type_only || has_token(spec, "type"),
                                offset,
                            });
                        }
                    }
                    _ => {}
                }
            }
        }
    }
    table
}

/// Resolves relative and aliased specifiers to files under the project.
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    /// `(prefix, directory)` pairs, longest prefix first.
    aliases: Vec<(String, PathBuf)>,
}

impl ModuleResolver {
    pub fn new<'a>(project_root: &Path, aliases: impl IntoIterator<Item = (&'a String, &'a String)>) -> Self {
        let mut aliases: Vec<(String, PathBuf)> = aliases
            .into_iter()
            .map(|(prefix, dir)| (prefix.clone(), project_root.join(dir)))
            .collect();
        aliases.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        Self { aliases }
    }

    /// Whether `specifier` points into the project rather than a package.
    pub fn is_local(&self, specifier: &str) -> bool {
        specifier.starts_with("./")
            || specifier.starts_with("../")
            || self.aliases.iter().any(|(p, _)| specifier.starts_with(p.as_str()))
    }

    /// Resolve `specifier` imported from a file in `from_dir`.
    ///
    /// Tries the path as given, then with each known extension, then as a
    /// directory with an `index` file.
    pub fn resolve(&self, from_dir: &Path, specifier: &str) -> Option<PathBuf> {
        let base = if specifier.starts_with("./") || specifier.starts_with("../") {
            from_dir.join(specifier)
        } else {
            let (prefix, dir) = self
                .aliases
                .iter()
                .find(|(p, _)| specifier.starts_with(p.as_str()))?;
            dir.join(&specifier[prefix.len()..])
        };

        if base.is_file() {
            return Some(base);
        }
        for ext in EXTENSIONS {
            let candidate = with_extra_extension(&base, ext);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        for ext in EXTENSIONS {
            let candidate = base.join(format!("index.{ext}"));
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    }
}

/// `foo/bar.service` + `ts` → `foo/bar.service.ts` (never replaces).
fn with_extra_extension(base: &Path, ext: &str) -> PathBuf {
    let mut s = base.as_os_str().to_owned();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}
