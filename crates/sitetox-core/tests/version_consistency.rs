//! Workspace manifest checks: shared version and per-crate dependency tables.

use std::path::{Path, PathBuf};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .unwrap()
        .to_path_buf()
}

fn manifest(path: &Path) -> toml::Value {
    std::fs::read_to_string(path.join("Cargo.toml"))
        .unwrap()
        .parse()
        .unwrap()
}

#[test]
fn members_inherit_workspace_version() {
    let root = workspace_root();
    let members = manifest(&root)["workspace"]["members"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m.as_str().unwrap().to_string())
        .collect::<Vec<_>>();
    assert_eq!(members.len(), 4);

    for member in members {
        let doc = manifest(&root.join(&member));
        let inherited = doc["package"]["version"]
            .get("workspace")
            .and_then(toml::Value::as_bool);
        assert_eq!(
            inherited,
            Some(true),
            "{member} should use version.workspace = true"
        );
    }
}

#[test]
fn workspace_version_matches_cargo_pkg() {
    let doc = manifest(&workspace_root());
    let version = doc["workspace"]["package"]["version"].as_str().unwrap();
    assert_eq!(version, env!("CARGO_PKG_VERSION"));
    assert_eq!(version, sitetox_core::VERSION);
}

#[test]
fn reasoning_needs_tokio_only_for_tests() {
    let doc = manifest(&workspace_root().join("crates/sitetox-reasoning"));
    assert!(doc["dependencies"].get("tokio").is_none());
    assert!(doc["dev-dependencies"].get("tokio").is_some());
}
