//! tree-sitter plumbing shared by the extractors: parsing, node text,
//! pre-order traversal, and static type inference for literals and type
//! annotations.

use std::path::Path;
use tree_sitter::{Language, Node, Parser, Tree};

use route_registry_core::models::TypeTag;
use route_registry_core::{RegistryError, Result};

/// Parse a JS/TS source file.
///
/// `.ts`, `.mts` and `.cts` files use the plain TypeScript grammar (so
/// `<T>expr` assertions parse); everything else uses TSX.
///
/// # Errors
///
/// [`RegistryError::Parse`] if the grammar cannot be loaded or the tree
/// contains syntax errors. The reason names the first error position.
pub fn parse_source(path: &Path, code: &str) -> Result<Tree> {
    let language: Language = match path.extension().and_then(|e| e.to_str()) {
        Some("ts") | Some("mts") | Some("cts") => {
            tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
        }
        _ => tree_sitter_typescript::LANGUAGE_TSX.into(),
    };

    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| RegistryError::parse(path, format!("failed to load grammar: {e}")))?;

    let tree = parser
        .parse(code, None)
        .ok_or_else(|| RegistryError::parse(path, "parser returned no tree"))?;

    let root = tree.root_node();
    if root.has_error() {
        let reason = match first_error(root) {
            Some(node) => format!(
                "syntax error at {}:{}",
                node.start_position().row + 1,
                node.start_position().column + 1
            ),
            None => "syntax error".to_string(),
        };
        return Err(RegistryError::parse(path, reason));
    }

    Ok(tree)
}

fn first_error(root: Node) -> Option<Node> {
    let mut found = None;
    walk_preorder(root, |node| {
        if found.is_none() && (node.is_error() || node.is_missing()) {
            found = Some(node);
        }
    });
    found
}

/// Visit every node under `root` (inclusive) in source order.
pub fn walk_preorder<'t>(root: Node<'t>, mut visit: impl FnMut(Node<'t>)) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        visit(node);
        let mut cursor = node.walk();
        let children: Vec<Node<'t>> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
}

pub fn text<'a>(code: &'a str, node: Node) -> &'a str {
    &code[node.byte_range()]
}

/// Contents of a `string` or `template_string` node without delimiters.
pub fn string_contents(code: &str, node: Node) -> String {
    let raw = text(code, node);
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), trimmed.chars().last()) {
        (Some(open), Some(close))
            if trimmed.len() >= 2 && open == close && matches!(open, '"' | '\'' | '`') =>
        {
            trimmed[1..trimmed.len() - 1].to_string()
        }
        _ => trimmed.to_string(),
    }
}

/// Collapse runs of whitespace to single spaces.
pub fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn has_token(node: Node, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| !c.is_named() && c.kind() == token);
    found
}

/// Infer a [`TypeTag`] from an expression node.
pub fn infer_expression(code: &str, node: Node) -> TypeTag {
    match node.kind() {
        "string" | "template_string" => TypeTag::String,
        "number" => TypeTag::Number,
        "true" | "false" => TypeTag::Boolean,
        "unary_expression" => {
            let op = node
                .child_by_field_name("operator")
                .map(|n| text(code, n))
                .unwrap_or("");
            match op {
                "!" => TypeTag::Boolean,
                "-" | "+" => match node.child_by_field_name("argument") {
                    Some(arg) if arg.kind() == "number" => TypeTag::Number,
                    _ => TypeTag::Unknown,
                },
                "typeof" => TypeTag::String,
                _ => TypeTag::Unknown,
            }
        }
        "parenthesized_expression" => node
            .named_child(0)
            .map(|inner| infer_expression(code, inner))
            .unwrap_or(TypeTag::Unknown),
        "as_expression" | "satisfies_expression" | "type_assertion" => {
            let mut cursor = node.walk();
            let ty = node
                .named_children(&mut cursor)
                .filter(|c| is_type_node(c.kind()))
                .last();
            ty.map(|t| infer_type(code, t)).unwrap_or(TypeTag::Unknown)
        }
        _ => TypeTag::Unknown,
    }
}

fn is_type_node(kind: &str) -> bool {
    matches!(
        kind,
        "predefined_type" | "literal_type" | "type_identifier" | "type_arguments"
    )
}

/// Infer a [`TypeTag`] from a type node (`predefined_type`,
/// `literal_type`, or a `type_annotation` wrapping one).
pub fn infer_type(code: &str, node: Node) -> TypeTag {
    match node.kind() {
        "type_annotation" | "parenthesized_type" => node
            .named_child(0)
            .map(|inner| infer_type(code, inner))
            .unwrap_or(TypeTag::Unknown),
        "predefined_type" => match text(code, node) {
            "string" => TypeTag::String,
            "number" | "bigint" => TypeTag::Number,
            "boolean" => TypeTag::Boolean,
            _ => TypeTag::Unknown,
        },
        "literal_type" => node
            .named_child(0)
            .map(|inner| infer_expression(code, inner))
            .unwrap_or(TypeTag::Unknown),
        "type_identifier" => match text(code, node) {
            "String" => TypeTag::String,
            "Number" => TypeTag::Number,
            "Boolean" => TypeTag::Boolean,
            _ => TypeTag::Unknown,
        },
        _ => TypeTag::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_of_kind<'t>(tree: &'t Tree, kind: &str) -> Node<'t> {
        let mut found = None;
        walk_preorder(tree.root_node(), |n| {
            if found.is_none() && n.kind() == kind {
                found = Some(n);
            }
        });
        found.unwrap_or_else(|| panic!("no {kind} node"))
    }

    #[test]
    fn test_parse_reports_error_position() {
        let err = parse_source(Path::new("page.tsx"), "export default function (((").unwrap_err();
        match err {
            RegistryError::Parse { reason, .. } => assert!(reason.starts_with("syntax error")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_tsx_ok() {
        let code = "export default function P() { return <div className=\"x\">hi</div>; }";
        assert!(parse_source(Path::new("page.tsx"), code).is_ok());
    }

    #[test]
    fn test_infer_literals() {
        let code = "f('a', 1, -2, true, !x, `t`, y, (3), z as number);";
        let tree = parse_source(Path::new("a.ts"), code).unwrap();
        let args = first_of_kind(&tree, "arguments");
        let mut cursor = args.walk();
        let tags: Vec<TypeTag> = args
            .named_children(&mut cursor)
            .map(|n| infer_expression(code, n))
            .collect();
        assert_eq!(
            tags,
            vec![
                TypeTag::String,
                TypeTag::Number,
                TypeTag::Number,
                TypeTag::Boolean,
                TypeTag::Boolean,
                TypeTag::String,
                TypeTag::Unknown,
                TypeTag::Number,
                TypeTag::Number,
            ]
        );
    }

    #[test]
    fn test_infer_type_annotation() {
        let code = "function f(a: string, b: boolean, c: Foo, d: 'x') {}";
        let tree = parse_source(Path::new("a.ts"), code).unwrap();
        let params = first_of_kind(&tree, "formal_parameters");
        let mut cursor = params.walk();
        let tags: Vec<TypeTag> = params
            .named_children(&mut cursor)
            .filter_map(|p| p.child_by_field_name("type"))
            .map(|t| infer_type(code, t))
            .collect();
        assert_eq!(
            tags,
            vec![TypeTag::String, TypeTag::Boolean, TypeTag::Unknown, TypeTag::String]
        );
    }

    #[test]
    fn test_string_contents() {
        let code = "const a = \"hello\"; const b = `q ${x}`;";
        let tree = parse_source(Path::new("a.ts"), code).unwrap();
        let s = first_of_kind(&tree, "string");
        assert_eq!(string_contents(code, s), "hello");
        let t = first_of_kind(&tree, "template_string");
        assert_eq!(string_contents(code, t), "q ${x}");
    }
}
