//! `rreg show`: print one stored artifact.

use anyhow::{Context, Result};

use route_registry_core::models::RouteRegistry;

use crate::artifact::load_artifact;
use crate::config::Config;
use crate::scan::display_route;

pub fn run_show(config: &Config, route: &str, json: bool) -> Result<()> {
    let route = route.trim_matches('/');
    let dir = config.project.registry_path();
    let registry = load_artifact(&dir, route)
        .with_context(|| format!("Failed to load registry for route '{}'", display_route(route)))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&registry)?);
        return Ok(());
    }

    print_registry(&registry);
    Ok(())
}

fn print_registry(registry: &RouteRegistry) {
    println!("--- Route ---");
    println!("route:      {}", display_route(&registry.route));
    println!("entry_file: {}", registry.entry_file);
    println!("scanned_at: {}", registry.scanned_at.to_rfc3339());
    println!("version:    {}", registry.version);
    println!();

    println!("--- Components ({}) ---", registry.components.len());
    for (i, c) in registry.components.iter().enumerate() {
        println!("[{}] {} ({}) at {}", i, c.name, c.import_source, c.source_location);
        for (prop, ty) in &c.props_signature {
            println!("    {}: {}", prop, ty);
        }
        if let Some(url) = &c.link_url {
            println!("    -> {}", url);
        }
    }
    println!();

    println!("--- Actions ({}) ---", registry.actions.len());
    for (i, a) in registry.actions.iter().enumerate() {
        let params: Vec<String> = a
            .parameters
            .iter()
            .map(|p| format!("{}: {}", p.name, p.ty))
            .collect();
        println!("[{}] {} {}({}) from {}", i, a.kind, a.name, params.join(", "), a.source);
    }
}
