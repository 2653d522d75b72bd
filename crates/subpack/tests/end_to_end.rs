use std::fs;
use std::path::Path;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use serde_json::Value;
use subpack::dist::load_assets;
use subpack::dist::write_changed_assets;
use subpack::graph_input::BuildGraph;
use subpack::Pipeline;
use subpack::Stage;
use subpack::StageInput;
use subpack_bundling::Placement;
use subpack_config::ConfigLoader;
use subpack_core::diagnostic::ErrorKind;
use subpack_filesystem::os_file_system::OsFileSystem;
use subpack_filesystem::FileSystemRef;

const PAGES: &str = r#"{
  pages: ['pages/index/index'],
  subPackages: [
    { root: 'subA', pages: ['p'] },
    { root: 'subB' },
  ],
}"#;

const GRAPH: &str = r#"{
  "modules": [
    {
      "id": "pages/index/index.vue",
      "resource": "pages/index/index.vue",
      "kind": "component",
      "consumers": [{ "name": "pages/index/index" }]
    },
    {
      "id": "subA/p.vue",
      "resource": "subA/p.vue",
      "kind": "component",
      "consumers": [{ "name": "subA/p" }]
    },
    {
      "id": "subB/page.vue",
      "resource": "subB/page.vue",
      "kind": "component",
      "consumers": [{ "name": "subB/page" }]
    },
    {
      "id": "utils/shared.js",
      "resource": "utils/shared.js",
      "references": [{ "origin": "subA/p.vue" }, { "origin": "subB/page.vue" }],
      "consumers": [{ "name": "subA/p" }, { "name": "subB/page" }]
    },
    {
      "id": "subA/only.js",
      "resource": "subA/only.js",
      "references": [{ "origin": "subA/p.vue" }],
      "consumers": [{ "name": "subA/p" }]
    }
  ],
  "bundles": [
    { "id": "common/runtime", "hasRuntime": true },
    { "id": "subA/p", "dependencies": ["common/vendor", "subA/common/vendor"] }
  ]
}"#;

fn write(root: &Path, name: &str, contents: &str) {
  let path = root.join(name);
  fs::create_dir_all(path.parent().unwrap()).unwrap();
  fs::write(path, contents).unwrap();
}

fn project(dir: &Path) {
  write(dir, "src/pages.json", PAGES);
  write(
    dir,
    "subpack.config.json5",
    "{ appendSubPackages: [{ root: 'subC', pages: [] }] }",
  );
  write(
    dir,
    "src/subA/components/async.component.json",
    r#"{ "card": { "usingComponents": { "loading": "/subA/components/loading" } } }"#,
  );
  write(dir, "graph.json", GRAPH);

  write(
    dir,
    "dist/app.json",
    r#"{"pages":["pages/index/index"],"subPackages":[{"root":"subA","pages":["p"]}]}"#,
  );
  write(
    dir,
    "dist/subA/p.js",
    r#"var chart = __subpack_require_async__("subB/common/vendor");"#,
  );
  write(dir, "dist/subA/components/card.wxml", "<chart/>");
  write(
    dir,
    "dist/subA/components/card.json",
    r#"{"component":true,"usingComponents":{"chart":"/subB/chart"}}"#,
  );
  write(dir, "dist/subA/components/loading.wxml", "<view/>");
  write(dir, "dist/subB/chart.wxml", "<canvas/>");
  write(dir, "dist/subB/common/vendor.js", "vendor");
}

fn read_json(path: &Path) -> Value {
  serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn builds_a_project_with_subpackages() {
  let dir = tempfile::tempdir().unwrap();
  project(dir.path());

  let os_fs: FileSystemRef = Arc::new(OsFileSystem);
  let loaded = ConfigLoader::new(os_fs.clone(), dir.path().to_path_buf())
    .load(None, None)
    .unwrap();
  let graph = BuildGraph::load(&*os_fs, &dir.path().join("graph.json")).unwrap();

  let placement = Pipeline::place(&loaded.ctx, &graph.modules);
  assert_eq!(placement.placements.get("utils/shared.js"), Some(&Placement::Main));
  assert_eq!(
    placement.placements.get("subA/only.js"),
    Some(&Placement::Subpackage(String::from("subA")))
  );
  assert_eq!(
    placement.placements.get("subA/p.vue"),
    Some(&Placement::Unsplit)
  );

  let dist = dir.path().join("dist");
  let before = load_assets(&*os_fs, &dist).unwrap();
  let mut assets = before.clone();
  let report = Pipeline::default().run(
    &loaded.ctx,
    StageInput {
      bundle_graph: &graph.bundles,
      fragments: &loaded.fragments,
    },
    &mut assets,
  );

  assert_eq!(report.diagnostics.len(), 0, "{}", report.diagnostics);
  assert_eq!(report.completed, Stage::ALL.to_vec());

  let written = write_changed_assets(&*os_fs, &dist, &before, &assets).unwrap();
  assert_eq!(
    written,
    vec![
      String::from("app.json"),
      String::from("subA/components/card.json"),
      String::from("subA/p.js"),
    ]
  );

  assert_eq!(
    fs::read_to_string(dist.join("subA/p.js")).unwrap(),
    r#"var chart = require.async("../subB/common/vendor.js");"#
  );

  assert_eq!(
    read_json(&dist.join("subA/components/card.json")),
    json!({
      "component": true,
      "usingComponents": {
        "chart": "/subB/chart",
        "loading": "/subA/components/loading"
      },
      "componentPlaceholder": { "chart": "view" }
    })
  );

  let app = read_json(&dist.join("app.json"));
  assert_eq!(
    app["subPackages"],
    json!([
      { "root": "subA", "pages": ["p"] },
      { "root": "subC", "pages": [] },
      { "root": "subB", "pages": [] }
    ])
  );
}

#[test]
fn a_second_run_changes_nothing() {
  let dir = tempfile::tempdir().unwrap();
  project(dir.path());

  let os_fs: FileSystemRef = Arc::new(OsFileSystem);
  let loaded = ConfigLoader::new(os_fs.clone(), dir.path().to_path_buf())
    .load(None, None)
    .unwrap();
  let graph = BuildGraph::load(&*os_fs, &dir.path().join("graph.json")).unwrap();
  let dist = dir.path().join("dist");

  let run = || {
    let before = load_assets(&*os_fs, &dist).unwrap();
    let mut assets = before.clone();
    let report = Pipeline::default().run(
      &loaded.ctx,
      StageInput {
        bundle_graph: &graph.bundles,
        fragments: &loaded.fragments,
      },
      &mut assets,
    );
    assert!(report.is_success());
    write_changed_assets(&*os_fs, &dist, &before, &assets).unwrap()
  };

  assert_eq!(run().len(), 3);
  assert_eq!(run(), Vec::<String>::new());
}

#[test]
fn cross_subpackage_dependencies_fail_the_build() {
  let dir = tempfile::tempdir().unwrap();
  project(dir.path());
  write(
    dir.path(),
    "graph.json",
    r#"{ "bundles": [
      { "id": "subA/p", "dependencies": ["subB/common/vendor", "subB/common/vendor"] },
      { "id": "pages/index/index", "prefetch": ["subA/p"] }
    ] }"#,
  );

  let os_fs: FileSystemRef = Arc::new(OsFileSystem);
  let loaded = ConfigLoader::new(os_fs.clone(), dir.path().to_path_buf())
    .load(None, None)
    .unwrap();
  let graph = BuildGraph::load(&*os_fs, &dir.path().join("graph.json")).unwrap();
  let dist = dir.path().join("dist");
  let before = load_assets(&*os_fs, &dist).unwrap();
  let mut assets = before.clone();

  let report = Pipeline::default().run(
    &loaded.ctx,
    StageInput {
      bundle_graph: &graph.bundles,
      fragments: &loaded.fragments,
    },
    &mut assets,
  );

  assert_eq!(report.exit_code(), 1);
  assert_eq!(report.halted_at, Some(Stage::ValidateBundles));
  assert_eq!(
    report
      .diagnostics
      .iter()
      .map(|d| d.message.clone())
      .collect::<Vec<_>>(),
    vec![
      String::from(concat!(
        "The bundle is not allowed to have cross subpackage dependencies, ",
        "\"subA/p\" -> \"subB/common/vendor\""
      )),
      String::from(concat!(
        "Prefetch is not supported by the host, but prefetch bundles found ",
        "[\"subA/p\"] in bundle \"pages/index/index\""
      )),
    ]
  );
  assert_eq!(
    report
      .diagnostics
      .count_kind(ErrorKind::CrossSubpackageDependency),
    1
  );
  assert_eq!(assets, before);
}

#[test]
fn strict_policy_places_by_path() {
  let dir = tempfile::tempdir().unwrap();
  project(dir.path());

  let os_fs: FileSystemRef = Arc::new(OsFileSystem);
  let loaded = ConfigLoader::new(os_fs.clone(), dir.path().to_path_buf())
    .load(None, Some(true))
    .unwrap();
  let graph = BuildGraph::load(&*os_fs, &dir.path().join("graph.json")).unwrap();

  let placement = Pipeline::place(&loaded.ctx, &graph.modules);

  assert_eq!(placement.placements.get("utils/shared.js"), Some(&Placement::Main));
  assert_eq!(
    placement.placements.get("subA/only.js"),
    Some(&Placement::Subpackage(String::from("subA")))
  );
  assert_eq!(
    serde_json::to_value(&placement).unwrap()["placements"]["subA/only.js"],
    json!({
      "placement": { "type": "subpackage", "root": "subA" },
      "reason": { "reason": "underSubpackageRoot" }
    })
  );
}
