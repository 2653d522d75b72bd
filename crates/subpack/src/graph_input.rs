//! The module and bundle graphs exported by the host bundler.
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use subpack_core::types::BundleGraph;
use subpack_core::types::ModuleGraph;
use subpack_filesystem::FileSystem;
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildGraph {
  pub modules: ModuleGraph,
  pub bundles: BundleGraph,
}

impl BuildGraph {
  pub fn load(fs: &dyn FileSystem, path: &Path) -> anyhow::Result<Self> {
    let raw = fs
      .read_to_string(path)
      .with_context(|| format!("Failed to read the build graph {}", path.display()))?;

    let graph: BuildGraph = serde_json::from_str(&raw)
      .with_context(|| format!("Failed to parse the build graph {}", path.display()))?;

    debug!(
      modules = graph.modules.len(),
      bundles = graph.bundles.bundles().count(),
      "graph: loaded"
    );

    Ok(graph)
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;
  use subpack_core::types::ModuleKind;
  use subpack_filesystem::in_memory_file_system::InMemoryFileSystem;

  use super::*;

  #[test]
  fn loads_both_graphs() {
    let fs = InMemoryFileSystem::default();
    fs.write_file(
      Path::new("/dist/graph.json"),
      String::from(
        r#"{
          "modules": [
            { "id": "subA/page.vue", "kind": "component" },
            { "id": "utils/shared.js", "references": [{ "origin": "subA/page.vue" }] }
          ],
          "bundles": [{ "id": "subA/page", "dependencies": ["common/vendor"] }]
        }"#,
      ),
    );

    let graph = BuildGraph::load(&fs, Path::new("/dist/graph.json")).unwrap();

    assert_eq!(graph.modules.len(), 2);
    assert_eq!(
      graph.modules.get("utils/shared.js").map(|m| m.kind),
      Some(ModuleKind::Script)
    );
    assert_eq!(graph.modules.incoming("utils/shared.js").len(), 1);
    assert_eq!(
      graph.bundles.get("subA/page").map(|b| b.dependencies.clone()),
      Some(vec![String::from("common/vendor")])
    );
  }

  #[test]
  fn missing_sections_default_to_empty() {
    let fs = InMemoryFileSystem::default();
    fs.write_file(Path::new("/graph.json"), String::from("{}"));

    let graph = BuildGraph::load(&fs, Path::new("/graph.json")).unwrap();

    assert!(graph.modules.is_empty());
    assert_eq!(graph.bundles.bundles().count(), 0);
  }

  #[test]
  fn reports_the_graph_path_on_errors() {
    let fs = InMemoryFileSystem::default();

    let error = BuildGraph::load(&fs, Path::new("/missing.json")).unwrap_err();

    assert_eq!(
      error.to_string(),
      "Failed to read the build graph /missing.json"
    );
  }
}
