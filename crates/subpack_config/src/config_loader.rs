use std::path::Path;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use subpack_core::diagnostic::DiagnosticBuilder;
use subpack_core::diagnostic::ErrorKind;
use subpack_core::diagnostic_error;
use subpack_core::path::dirname;
use subpack_core::path::to_slash;
use subpack_core::types::PluginOptions;
use subpack_core::types::SubpackageSet;
use subpack_core::BuildContext;
use subpack_core::BuildContextBuilder;
use subpack_filesystem::FileSystemRef;
use subpack_manifest::FragmentTable;
use tracing::debug;
use tracing::info;

use crate::pages_json::PagesJson;

const PAGES_JSON: &str = "pages.json";
const PLUGIN_OPTIONS_FILE: &str = "subpack.config.json5";
const FRAGMENT_GLOB: &str = "**/async.component.json";

/// Everything a build needs before it starts.
#[derive(Debug)]
pub struct LoadedConfig {
  pub ctx: BuildContext,
  pub fragments: FragmentTable,
}

/// Loads and validates the declarative build configuration
pub struct ConfigLoader {
  fs: FileSystemRef,
  project_root: PathBuf,
  source_root: PathBuf,
}

impl ConfigLoader {
  pub fn new(fs: FileSystemRef, project_root: PathBuf) -> Self {
    ConfigLoader {
      fs,
      source_root: project_root.join("src"),
      project_root,
    }
  }

  pub fn with_source_root(mut self, source_root: PathBuf) -> Self {
    self.source_root = source_root;
    self
  }

  fn read_json5<T: DeserializeOwned>(&self, path: &Path) -> anyhow::Result<T> {
    let raw = self.fs.read_to_string(path).map_err(|source| {
      diagnostic_error!(DiagnosticBuilder::default()
        .kind(ErrorKind::NotFound)
        .message(format!("Failed to read {}: {source}", path.display()))
        .origin("config")
        .subjects(vec![to_slash(path)]))
    })?;

    serde_json5::from_str(&raw).map_err(|error| {
      diagnostic_error!(DiagnosticBuilder::default()
        .kind(ErrorKind::ParseError)
        .message(format!("Failed to parse {}: {error}", path.display()))
        .origin("config")
        .subjects(vec![to_slash(path)]))
    })
  }

  pub fn load_pages_json(&self) -> anyhow::Result<PagesJson> {
    self.read_json5(&self.source_root.join(PAGES_JSON))
  }

  /// Reads plugin options from `path`, or from the project's `subpack.config.json5`.
  ///
  /// The default file is optional; an explicitly given file must exist.
  pub fn load_plugin_options(&self, path: Option<&Path>) -> anyhow::Result<PluginOptions> {
    match path {
      Some(path) => self.read_json5(path),
      None => {
        let path = self.project_root.join(PLUGIN_OPTIONS_FILE);
        if !self.fs.is_file(&path) {
          debug!(path = %path.display(), "config: no plugin options file");
          return Ok(PluginOptions::default());
        }
        self.read_json5(&path)
      }
    }
  }

  /// Collects every `async.component.json` under the source root.
  pub fn load_fragments(&self) -> anyhow::Result<FragmentTable> {
    let mut builder = FragmentTable::builder();

    for file in self.fs.walk_files(&self.source_root)? {
      let Ok(relative) = file.strip_prefix(&self.source_root) else {
        continue;
      };
      let relative = to_slash(relative);

      if !glob_match::glob_match(FRAGMENT_GLOB, &relative) {
        continue;
      }

      let contents = self.fs.read_to_string(&file)?;
      builder.add_file(dirname(&relative), &relative, &contents)?;
    }

    let fragments = builder.finish().map_err(anyhow::Error::new)?;
    debug!(components = fragments.len(), "config: fragments loaded");

    Ok(fragments)
  }

  pub fn build_context(&self, pages: &PagesJson, options: PluginOptions) -> BuildContext {
    let mut builder = BuildContextBuilder::default();
    builder
      .source_root(self.source_root.clone())
      .subpackages(SubpackageSet::new(pages.sub_packages.clone()))
      .declared_global_tags(pages.global_tags())
      .options(options);

    // Every field has a default
    builder.build().unwrap_or_default()
  }

  /// Loads the whole configuration. `strict` overrides the placement policy of the
  /// options file when given.
  pub fn load(&self, config: Option<&Path>, strict: Option<bool>) -> anyhow::Result<LoadedConfig> {
    let pages = self.load_pages_json()?;
    let mut options = self.load_plugin_options(config)?;

    if let Some(strict) = strict {
      options.strict = strict;
    }

    let fragments = self.load_fragments()?;
    let ctx = self.build_context(&pages, options);

    info!(
      subpackages = ctx.subpackages.roots().count(),
      fragments = fragments.len(),
      policy = ?ctx.policy(),
      "config: loaded"
    );

    Ok(LoadedConfig { ctx, fragments })
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use pretty_assertions::assert_eq;
  use subpack_core::diagnostic::Diagnostic;
  use subpack_core::types::PackageRoot;
  use subpack_core::PlacementPolicy;
  use subpack_filesystem::in_memory_file_system::InMemoryFileSystem;

  use super::*;

  fn file_system(files: &[(&str, &str)]) -> FileSystemRef {
    let fs = InMemoryFileSystem::default();
    for (path, contents) in files {
      fs.write_file(Path::new(path), contents.to_string());
    }
    Arc::new(fs)
  }

  const PAGES: &str = r#"{
    pages: ['pages/index/index'],
    subPackages: [{ root: 'subA', pages: ['p'] }, { root: 'subB' }],
    globalStyle: { usingComponents: { 'app-loading': '/components/loading' } },
  }"#;

  #[test]
  fn loads_the_build_context() {
    let fs = file_system(&[
      ("/project/src/pages.json", PAGES),
      ("/project/subpack.config.json5", "{ strict: true, deleteComponents: ['x'] }"),
      (
        "/project/src/subA/components/async.component.json",
        r#"{ "card": { "componentPlaceholder": { "chart": "view" } } }"#,
      ),
      ("/project/src/async.component.json.bak", "not json"),
    ]);

    let loaded = ConfigLoader::new(fs, PathBuf::from("/project"))
      .load(None, None)
      .unwrap();

    assert_eq!(loaded.ctx.policy(), PlacementPolicy::Strict);
    assert_eq!(loaded.ctx.options.delete_components, vec![String::from("x")]);
    assert_eq!(
      loaded.ctx.classify("subB/x.js"),
      PackageRoot::Subpackage(String::from("subB"))
    );
    assert!(loaded.ctx.declared_global_tags.contains("app-loading"));
    assert_eq!(
      loaded.fragments.keys().collect::<Vec<_>>(),
      vec!["subA/components/card"]
    );
  }

  #[test]
  fn plugin_options_file_is_optional() {
    let fs = file_system(&[("/project/src/pages.json", PAGES)]);

    let loaded = ConfigLoader::new(fs, PathBuf::from("/project"))
      .load(None, Some(true))
      .unwrap();

    assert_eq!(loaded.ctx.options.delete_components, Vec::<String>::new());
    assert_eq!(loaded.ctx.policy(), PlacementPolicy::Strict);
  }

  #[test]
  fn explicit_plugin_options_must_exist() {
    let fs = file_system(&[("/project/src/pages.json", PAGES)]);

    let error = ConfigLoader::new(fs, PathBuf::from("/project"))
      .load(Some(Path::new("/project/missing.json5")), None)
      .unwrap_err();

    assert_eq!(
      error.downcast_ref::<Diagnostic>().map(|d| d.kind),
      Some(ErrorKind::NotFound)
    );
  }

  #[test]
  fn parse_errors_name_the_file() {
    let fs = file_system(&[("/project/src/pages.json", "{ pages: [")]);

    let error = ConfigLoader::new(fs, PathBuf::from("/project"))
      .load_pages_json()
      .unwrap_err();
    let diagnostic = error.downcast_ref::<Diagnostic>().unwrap();

    assert_eq!(diagnostic.kind, ErrorKind::ParseError);
    assert_eq!(diagnostic.subjects, vec![String::from("/project/src/pages.json")]);
  }

  #[test]
  fn duplicate_fragments_fail_before_the_build() {
    let fragment = r#"{ "card": {} }"#;
    let fs = file_system(&[
      ("/project/src/pages.json", PAGES),
      ("/project/src/subA/async.component.json", r#"{ "components/card": {} }"#),
      ("/project/src/subA/components/async.component.json", fragment),
    ]);

    let error = ConfigLoader::new(fs, PathBuf::from("/project"))
      .load_fragments()
      .unwrap_err();

    assert_eq!(
      error.downcast_ref::<Diagnostic>().map(|d| d.kind),
      Some(ErrorKind::DuplicateFragment)
    );
  }
}
