//! Component extraction: JSX elements and `createElement` calls whose tag
//! resolves to an imported binding.

use std::collections::{BTreeMap, HashMap};
use tree_sitter::Node;

use route_registry_core::models::{SourceLocation, TypeTag, UIComponent};

use super::imports::ImportTable;
use super::summary::component_summary;
use super::syntax::{collapse_ws, infer_expression, string_contents, text, walk_preorder};

struct Collector<'a> {
    code: &'a str,
    file: &'a str,
    imports: &'a ImportTable,
    components: Vec<UIComponent>,
    by_name: HashMap<String, usize>,
}

/// Extract components from `root` in first-occurrence order, one per
/// distinct tag name.
pub fn extract_components(code: &str, root: Node, imports: &ImportTable, file: &str) -> Vec<UIComponent> {
    let mut collector = Collector {
        code,
        file,
        imports,
        components: Vec::new(),
        by_name: HashMap::new(),
    };

    walk_preorder(root, |node| match node.kind() {
        "jsx_opening_element" | "jsx_self_closing_element" => collector.jsx(node),
        "call_expression" => collector.create_element(node),
        _ => {}
    });

    let mut components = collector.components;
    for c in &mut components {
        c.textual_summary = component_summary(c);
    }
    components
}

/// A single call site before merging.
#[derive(Default)]
struct Site {
    props: Vec<(String, TypeTag)>,
    events: Vec<String>,
    accessibility: Vec<(String, String)>,
    text: Option<String>,
    link: Option<String>,
}

impl<'a> Collector<'a> {
    fn jsx(&mut self, node: Node) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = text(self.code, name_node);
        if is_intrinsic(name) {
            return;
        }

        let mut site = Site::default();
        let mut cursor = node.walk();
        for attr in node.named_children(&mut cursor) {
            match attr.kind() {
                "jsx_attribute" => self.attribute(attr, &mut site),
                "jsx_expression" => {
                    tracing::debug!(
                        file = self.file,
                        component = name,
                        line = attr.start_position().row + 1,
                        "skipping spread attribute"
                    );
                }
                _ => {}
            }
        }

        if node.kind() == "jsx_opening_element" {
            if let Some(element) = node.parent() {
                site.text = jsx_text(self.code, element);
            }
        }

        self.record(name, node, site);
    }

    fn attribute(&self, attr: Node, site: &mut Site) {
        let Some(name_node) = attr.named_child(0) else {
            return;
        };
        let name = text(self.code, name_node).to_string();
        let value = attr.named_child(1);

        let ty = match value {
            None => TypeTag::Boolean,
            Some(v) if v.kind() == "string" => TypeTag::String,
            Some(v) if v.kind() == "jsx_expression" => v
                .named_child(0)
                .map(|inner| infer_expression(self.code, inner))
                .unwrap_or(TypeTag::Unknown),
            Some(_) => TypeTag::Unknown,
        };

        if is_event_prop(&name) {
            site.events.push(name.clone());
        }
        if name == "role" || name.starts_with("aria-") {
            if let Some(v) = value.and_then(|v| static_value(self.code, v)) {
                site.accessibility.push((name.clone(), v));
            }
        }
        if name == "href" {
            site.link = value.and_then(|v| static_value(self.code, v));
        }
        site.props.push((name, ty));
    }

    fn create_element(&mut self, call: Node) {
        let Some(function) = call.child_by_field_name("function") else {
            return;
        };
        let callee = text(self.code, function);
        if callee != "createElement" && !callee.ends_with(".createElement") {
            return;
        }
        let Some(args) = call.child_by_field_name("arguments") else {
            return;
        };
        let mut cursor = args.walk();
        let args: Vec<Node> = args.named_children(&mut cursor).collect();
        let Some(&target) = args.first() else {
            return;
        };
        if !matches!(target.kind(), "identifier" | "member_expression") {
            tracing::debug!(
                file = self.file,
                line = call.start_position().row + 1,
                "skipping dynamic createElement target"
            );
            return;
        }

        let mut site = Site::default();
        if let Some(&props) = args.get(1).filter(|n| n.kind() == "object") {
            let mut cursor = props.walk();
            for entry in props.named_children(&mut cursor) {
                match entry.kind() {
                    "pair" => {
                        let (Some(key), Some(value)) = (
                            entry.child_by_field_name("key"),
                            entry.child_by_field_name("value"),
                        ) else {
                            continue;
                        };
                        let key = string_contents(self.code, key);
                        if is_event_prop(&key) {
                            site.events.push(key.clone());
                        }
                        if key == "role" || key.starts_with("aria-") {
                            if let Some(v) = static_value(self.code, value) {
                                site.accessibility.push((key.clone(), v));
                            }
                        }
                        if key == "href" {
                            site.link = static_value(self.code, value);
                        }
                        site.props.push((key, infer_expression(self.code, value)));
                    }
                    "shorthand_property_identifier" => {
                        site.props.push((text(self.code, entry).to_string(), TypeTag::Unknown));
                    }
                    "spread_element" => {
                        tracing::debug!(
                            file = self.file,
                            line = entry.start_position().row + 1,
                            "skipping spread props"
                        );
                    }
                    _ => {}
                }
            }
        }

        let name = text(self.code, target);
        if is_intrinsic(name) {
            return;
        }
        self.record(name, call, site);
    }

    fn record(&mut self, name: &str, at: Node, site: Site) {
        let root_symbol = name.split('.').next().unwrap_or(name);
        let imports = self.imports;
        let binding = match imports.get(root_symbol) {
            Some(b) if !b.type_only => b,
            _ => {
                tracing::debug!(
                    file = self.file,
                    component = name,
                    line = at.start_position().row + 1,
                    "skipping component not bound to an import"
                );
                return;
            }
        };

        let index = match self.by_name.get(name) {
            Some(&i) => i,
            None => {
                let pos = at.start_position();
                self.components.push(UIComponent {
                    name: name.to_string(),
                    import_source: binding.source.clone(),
                    props_signature: BTreeMap::new(),
                    source_location: SourceLocation {
                        file: self.file.to_string(),
                        line: pos.row + 1,
                        column: pos.column + 1,
                    },
                    text_content: None,
                    link_url: None,
                    accessibility: BTreeMap::new(),
                    events: Vec::new(),
                    textual_summary: String::new(),
                });
                self.by_name.insert(name.to_string(), self.components.len() - 1);
                self.components.len() - 1
            }
        };

        let component = &mut self.components[index];
        for (prop, ty) in site.props {
            component
                .props_signature
                .entry(prop)
                .and_modify(|seen| *seen = seen.merge(ty))
                .or_insert(ty);
        }
        for event in site.events {
            if !component.events.contains(&event) {
                component.events.push(event);
            }
        }
        for (key, value) in site.accessibility {
            component.accessibility.entry(key).or_insert(value);
        }
        if component.text_content.is_none() {
            component.text_content = site.text;
        }
        if component.link_url.is_none() {
            component.link_url = site.link;
        }
    }
}

/// Lower-case tags without a member access are host elements (`div`).
fn is_intrinsic(name: &str) -> bool {
    !name.contains('.') && name.chars().next().is_some_and(|c| c.is_ascii_lowercase())
}

/// `onClick`, `onSubmit`; not `one` or `online`.
fn is_event_prop(name: &str) -> bool {
    name.strip_prefix("on")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase())
}

/// Literal text of an attribute value, if statically known.
fn static_value(code: &str, value: Node) -> Option<String> {
    match value.kind() {
        "string" | "template_string" => Some(string_contents(code, value)),
        "number" | "true" | "false" => Some(text(code, value).to_string()),
        "jsx_expression" => value
            .named_child(0)
            .filter(|inner| inner.kind() != "template_string" || inner.named_child_count() == 0)
            .and_then(|inner| static_value(code, inner)),
        _ => None,
    }
}

/// Direct static text children of a `jsx_element`.
fn jsx_text(code: &str, element: Node) -> Option<String> {
    if element.kind() != "jsx_element" {
        return None;
    }
    let mut cursor = element.walk();
    let pieces: Vec<String> = element
        .named_children(&mut cursor)
        .filter_map(|child| match child.kind() {
            "jsx_text" => Some(text(code, child).to_string()),
            "jsx_expression" => child
                .named_child(0)
                .filter(|inner| inner.kind() == "string")
                .map(|inner| string_contents(code, inner)),
            _ => None,
        })
        .collect();
    let joined = collapse_ws(&pieces.join(" "));
    (!joined.is_empty()).then_some(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::imports::collect_imports;
    use crate::scanner::syntax::parse_source;
    use std::path::Path;

    fn extract(code: &str) -> Vec<UIComponent> {
        let tree = parse_source(Path::new("page.tsx"), code).unwrap();
        let imports = collect_imports(code, tree.root_node());
        extract_components(code, tree.root_node(), &imports, "a/b/page.tsx")
    }

    #[test]
    fn test_imported_jsx_components_in_order() {
        let code = r#"
import { Card } from "@/components/ui/card";
import { Button } from "@/components/ui/button";
import * as Tabs from "@radix-ui/react-tabs";

function Local() { return <span />; }

export default function Page() {
  return (
    <Card title="Treasures" count={3}>
      <div className="p-4">
        <Button variant="ghost" disabled onClick={() => save()} aria-label="Save treasure">
          Save   it
        </Button>
        <Tabs.List />
        <Local />
        <Button variant={flag} />
      </div>
    </Card>
  );
}
"#;
        let components = extract(code);
        let names: Vec<&str> = components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Card", "Button", "Tabs.List"]);

        let card = &components[0];
        assert_eq!(card.props_signature["title"], TypeTag::String);
        assert_eq!(card.props_signature["count"], TypeTag::Number);
        assert_eq!(card.import_source, "@/components/ui/card");
        assert_eq!(card.source_location.file, "a/b/page.tsx");
        assert_eq!(card.source_location.line, 10);
        assert_eq!(card.source_location.column, 5);

        let button = &components[1];
        assert_eq!(button.props_signature["disabled"], TypeTag::Boolean);
        // "ghost" then an identifier: the two sites disagree.
        assert_eq!(button.props_signature["variant"], TypeTag::Unknown);
        assert_eq!(button.events, vec!["onClick".to_string()]);
        assert_eq!(button.accessibility["aria-label"], "Save treasure");
        assert_eq!(button.text_content.as_deref(), Some("Save it"));
        assert!(button.textual_summary.starts_with("Component Button from @/components/ui/button"));

        assert_eq!(components[2].import_source, "@radix-ui/react-tabs");
    }

    #[test]
    fn test_create_element_calls() {
        let code = r#"
import React from "react";
import { Badge } from "./badge";

export default function Page() {
  return React.createElement(Badge, { tone: "gold", size: 2, ...rest, live });
}
"#;
        let components = extract(code);
        assert_eq!(components.len(), 1);
        let badge = &components[0];
        assert_eq!(badge.name, "Badge");
        assert_eq!(badge.props_signature["tone"], TypeTag::String);
        assert_eq!(badge.props_signature["size"], TypeTag::Number);
        assert_eq!(badge.props_signature["live"], TypeTag::Unknown);
        assert_eq!(badge.props_signature.len(), 3);
    }

    #[test]
    fn test_spread_and_type_only_skipped() {
        let code = r#"
import type { Props } from "./types";
import { Panel } from "./panel";

export default function Page(p: Props) {
  return <Panel {...p} open />;
}
"#;
        let components = extract(code);
        assert_eq!(components.len(), 1);
        assert_eq!(
            components[0].props_signature,
            BTreeMap::from([("open".to_string(), TypeTag::Boolean)])
        );
    }

    #[test]
    fn test_static_href_becomes_link_url() {
        let code = r#"
import Link from "next/link";
import { NavItem } from "./nav";

export default function Page({ id }) {
  return (
    <nav>
      <Link href={`/treasure/${id}`}>Open</Link>
      <Link href="/settings">Settings</Link>
      <NavItem href={"/profile"} />
    </nav>
  );
}
"#;
        let components = extract(code);
        let link = &components[0];
        assert_eq!(link.name, "Link");
        assert_eq!(link.link_url.as_deref(), Some("/settings"));
        assert_eq!(link.props_signature["href"], TypeTag::String);
        assert!(link.textual_summary.contains("links to /settings"));
        assert_eq!(components[1].link_url.as_deref(), Some("/profile"));
    }

    #[test]
    fn test_event_prop_names() {
        assert!(is_event_prop("onClick"));
        assert!(!is_event_prop("online"));
        assert!(!is_event_prop("on"));
        assert!(is_intrinsic("div"));
        assert!(!is_intrinsic("motion.div"));
        assert!(!is_intrinsic("Card"));
    }
}
