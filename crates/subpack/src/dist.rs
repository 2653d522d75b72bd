//! Reading the emitted output directory into an asset table and writing it back.
use std::path::Path;

use anyhow::Context;
use subpack_core::path::to_slash;
use subpack_core::types::AssetTable;
use subpack_filesystem::FileSystem;
use tracing::debug;
use tracing::info;

/// Loads every file under `dist` keyed by its output-relative name.
pub fn load_assets(fs: &dyn FileSystem, dist: &Path) -> anyhow::Result<AssetTable> {
  let mut assets = AssetTable::new();

  let files = fs.walk_files(dist)
    .with_context(|| format!("Failed to list the output directory {}", dist.display()))?;

  for file in files {
    let Ok(relative) = file.strip_prefix(dist) else {
      continue;
    };
    let contents = fs
      .read(&file)
      .with_context(|| format!("Failed to read {}", file.display()))?;
    assets.insert(to_slash(relative), contents);
  }

  debug!(assets = assets.len(), dist = %dist.display(), "dist: assets loaded");
  Ok(assets)
}

/// Writes the assets of `after` whose contents differ from `before`.
///
/// Returns the names written, in asset order.
pub fn write_changed_assets(
  fs: &dyn FileSystem,
  dist: &Path,
  before: &AssetTable,
  after: &AssetTable,
) -> anyhow::Result<Vec<String>> {
  let mut written = Vec::new();

  for (name, contents) in after.iter() {
    if before.get(name) == Some(contents) {
      continue;
    }

    let path = dist.join(name);
    if let Some(parent) = path.parent() {
      fs.create_dir_all(parent)?;
    }
    fs.write(&path, contents)
      .with_context(|| format!("Failed to write {}", path.display()))?;
    written.push(name.to_string());
  }

  info!(written = written.len(), "dist: assets written");
  Ok(written)
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;
  use subpack_filesystem::in_memory_file_system::InMemoryFileSystem;
  use subpack_filesystem::os_file_system::OsFileSystem;

  use super::*;

  #[test]
  fn loads_assets_with_relative_names() {
    let fs = InMemoryFileSystem::default();
    fs.write_file(Path::new("/dist/app.json"), String::from("{}"));
    fs.write_file(Path::new("/dist/subA/common/vendor.js"), String::from("v"));

    let assets = load_assets(&fs, Path::new("/dist")).unwrap();

    assert_eq!(
      assets.names().collect::<Vec<_>>(),
      vec!["app.json", "subA/common/vendor.js"]
    );
    assert_eq!(assets.source("subA/common/vendor.js").as_deref(), Some("v"));
  }

  #[test]
  fn writes_only_changed_assets() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("pages")).unwrap();
    std::fs::write(dir.path().join("app.json"), "{}").unwrap();
    std::fs::write(dir.path().join("pages/index.js"), "old").unwrap();

    let fs = OsFileSystem;
    let before = load_assets(&fs, dir.path()).unwrap();
    let mut after = before.clone();
    after.replace("pages/index.js", "new");

    let written = write_changed_assets(&fs, dir.path(), &before, &after).unwrap();

    assert_eq!(written, vec![String::from("pages/index.js")]);
    assert_eq!(
      std::fs::read_to_string(dir.path().join("pages/index.js")).unwrap(),
      "new"
    );
    assert_eq!(std::fs::read_to_string(dir.path().join("app.json")).unwrap(), "{}");
  }
}
