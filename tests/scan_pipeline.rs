//! Library-level pipeline tests: scan → persist → load → index → search.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

use route_registry::artifact::{load_all, load_artifact, write_artifact};
use route_registry::config::Config;
use route_registry::scanner::RegistryScanner;
use route_registry_core::embedding::HashingVectorizer;
use route_registry_core::models::{ActionKind, TypeTag};
use route_registry_core::store::RegistryVectorStore;
use route_registry_core::RegistryError;

fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

fn project() -> (TempDir, Config) {
    let tmp = TempDir::new().unwrap();
    let mut config = Config::minimal();
    config.project.root = tmp.path().to_path_buf();
    (tmp, config)
}

const MATCH_PAGE: &str = r#"
import { MatchCard } from "@/components/match-card";
import { Avatar, Badge } from "@/components/ui";
import { ACCEPT_MATCH, GET_MATCHES } from "@/graphql/matches";

export default function MatchPage() {
  const handleAccept = async (matchId: string, notify = true) => {};
  return (
    <section>
      <MatchCard score={0.92} verified>
        <Avatar size={40} alt="profile photo" />
        <Badge tone="gold">Top match</Badge>
      </MatchCard>
    </section>
  );
}
"#;

const MATCH_OPS: &str = r#"
import { gql } from "@apollo/client";

export const ACCEPT_MATCH = gql`
  mutation AcceptMatch($match_id: uuid!, $accepted_at: timestamptz) {
    update_matches_by_pk(pk_columns: {id: $match_id}) { id }
  }
`;

export const GET_MATCHES = gql`
  query GetMatches($limit: Int!, $active: Boolean) {
    matches(limit: $limit) { id }
  }
`;
"#;

#[test]
fn test_scan_extracts_components_and_actions_in_source_order() {
    let (tmp, config) = project();
    write(tmp.path(), "src/app/main/match/page.tsx", MATCH_PAGE);
    write(tmp.path(), "src/graphql/matches.ts", MATCH_OPS);

    let registry = RegistryScanner::new(&config).scan_route("main/match").unwrap();

    let components: Vec<&str> = registry.components.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(components, vec!["MatchCard", "Avatar", "Badge"]);
    assert_eq!(registry.components[0].props_signature["score"], TypeTag::Number);
    assert_eq!(registry.components[0].props_signature["verified"], TypeTag::Boolean);
    assert_eq!(registry.components[2].text_content.as_deref(), Some("Top match"));

    let actions: Vec<(&str, ActionKind)> = registry
        .actions
        .iter()
        .map(|a| (a.name.as_str(), a.kind))
        .collect();
    assert_eq!(
        actions,
        vec![
            ("AcceptMatch", ActionKind::Mutation),
            ("GetMatches", ActionKind::Query),
            ("handleAccept", ActionKind::Handler),
        ]
    );
    let accept = &registry.actions[0];
    assert_eq!(accept.parameters[0].name, "match_id");
    assert_eq!(accept.parameters[1].ty, TypeTag::String);
    assert_eq!(registry.actions[2].parameters[1].ty, TypeTag::Boolean);
}

#[test]
fn test_write_and_reload_is_equivalent() {
    let (tmp, config) = project();
    write(tmp.path(), "src/app/main/match/page.tsx", MATCH_PAGE);
    write(tmp.path(), "src/graphql/matches.ts", MATCH_OPS);

    let scanner = RegistryScanner::new(&config);
    let (registry, path) = scanner.scan_and_persist("main/match").unwrap();
    assert!(path.ends_with("main_match.registry.json"));

    let reloaded = load_artifact(scanner.registry_dir(), "main/match").unwrap();
    assert!(reloaded.same_content(&registry));
    assert_eq!(reloaded, {
        let mut expected = registry.clone();
        expected.scanned_at = reloaded.scanned_at;
        expected
    });
}

#[test]
fn test_unresolvable_references_do_not_fail_scan() {
    let (tmp, config) = project();
    write(
        tmp.path(),
        "src/app/page.tsx",
        r#"
import { Missing } from "@/graphql/absent";
import { Widget } from "some-package";

const Local = () => null;

export default function Home({ kind }) {
  const Dynamic = kind === "a" ? Widget : Local;
  return (
    <>
      <Dynamic />
      <Local />
      <Widget {...{ a: 1 }} />
    </>
  );
}
"#,
    );

    let registry = RegistryScanner::new(&config).scan_route("").unwrap();
    let names: Vec<&str> = registry.components.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Widget"]);
    assert!(registry.components[0].props_signature.is_empty());
    assert!(registry.actions.is_empty());
}

#[test]
fn test_rescan_replaces_route_in_store() {
    let (tmp, config) = project();
    write(tmp.path(), "src/app/main/match/page.tsx", MATCH_PAGE);
    write(tmp.path(), "src/graphql/matches.ts", MATCH_OPS);

    let scanner = RegistryScanner::new(&config);
    let store = RegistryVectorStore::new(Arc::new(HashingVectorizer::new(128, true).unwrap()));

    let first = scanner.scan_route("main/match").unwrap();
    store.add_registry(&first).unwrap();
    assert_eq!(store.entries_for_route("main/match"), 6);

    write(
        tmp.path(),
        "src/app/main/match/page.tsx",
        r#"
import { MatchCard } from "@/components/match-card";
export default function MatchPage() { return <MatchCard />; }
"#,
    );
    let second = scanner.scan_route("main/match").unwrap();
    store.add_registry(&second).unwrap();

    assert_eq!(store.entries_for_route("main/match"), 1);
    assert_eq!(store.route_count(), 1);
    let hits = store.find_similar_components("accept match", 10).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].source.label(), "MatchCard");
}

#[test]
fn test_load_all_then_search_routes() {
    let (tmp, config) = project();
    write(tmp.path(), "src/app/main/match/page.tsx", MATCH_PAGE);
    write(tmp.path(), "src/graphql/matches.ts", MATCH_OPS);
    write(
        tmp.path(),
        "src/app/settings/page.tsx",
        r#"
import { ThemeToggle } from "@/components/theme-toggle";
export async function updateNotificationSettings(enabled: boolean) {}
export default function Settings() { return <ThemeToggle dark={false} aria-label="toggle dark theme" />; }
"#,
    );

    let scanner = RegistryScanner::new(&config);
    for route in ["main/match", "settings"] {
        let registry = scanner.scan_route(route).unwrap();
        write_artifact(scanner.registry_dir(), &registry).unwrap();
    }

    let loaded = load_all(scanner.registry_dir()).unwrap();
    assert!(loaded.failures.is_empty());
    let store = RegistryVectorStore::with_hashing();
    for registry in &loaded.registries {
        store.add_registry(registry).unwrap();
    }

    let hits = store.find_similar_routes("dark theme notification settings", 5).unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].owner_id, "settings");
    assert!(hits[0].score > hits[1].score);

    let by_vector = store.find_similar_routes_by_vector(&[1.0, 0.0], 5).unwrap_err();
    assert!(matches!(by_vector, RegistryError::Usage { actual: 2, .. }));
}
