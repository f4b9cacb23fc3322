//! Plain-English summaries of components and actions. These sentences are
//! what the vectorizer embeds, so they name everything a search query is
//! likely to mention.

use route_registry_core::models::{ActionDescriptor, ActionKind, UIComponent};

pub fn component_summary(c: &UIComponent) -> String {
    let mut parts = vec![format!("Component {} from {}", c.name, c.import_source)];

    if c.props_signature.is_empty() {
        parts.push("no props".to_string());
    } else {
        let props: Vec<String> = c
            .props_signature
            .iter()
            .map(|(name, ty)| format!("{name} ({ty})"))
            .collect();
        parts.push(format!("props {}", props.join(", ")));
    }

    if !c.events.is_empty() {
        parts.push(format!("handles {}", c.events.join(", ")));
    }

    if !c.accessibility.is_empty() {
        let a11y: Vec<String> = c
            .accessibility
            .iter()
            .map(|(k, v)| format!("{k} {v}"))
            .collect();
        parts.push(format!("accessibility {}", a11y.join(", ")));
    }

    if let Some(text) = &c.text_content {
        parts.push(format!("text \"{text}\""));
    }

    if let Some(url) = &c.link_url {
        parts.push(format!("links to {url}"));
    }

    format!("{}.", parts.join("; "))
}

pub fn action_summary(a: &ActionDescriptor) -> String {
    let kind = match a.kind {
        ActionKind::Query => "Query",
        ActionKind::Mutation => "Mutation",
        ActionKind::Handler => "Handler",
    };
    let params = if a.parameters.is_empty() {
        "no parameters".to_string()
    } else {
        let list: Vec<String> = a
            .parameters
            .iter()
            .map(|p| format!("{} ({})", p.name, p.ty))
            .collect();
        format!("parameters {}", list.join(", "))
    };
    format!("{kind} action {} with {params}; defined in {}.", a.name, a.source)
}
