use std::collections::HashSet;
use std::path::PathBuf;

use derive_builder::Builder;

use crate::types::PackageRoot;
use crate::types::PluginOptions;
use crate::types::SubpackageSet;

/// Which rule set assigns modules to bundles.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum PlacementPolicy {
  /// Placement is a function of the module path only
  Strict,
  /// Placement follows the reference graph
  #[default]
  Compat,
}

/// Immutable configuration shared by every stage of a single build.
///
/// Built once per invocation and passed by reference; nothing mutates it afterwards.
#[derive(Builder, Clone, Debug, PartialEq)]
#[builder(default, setter(into))]
pub struct BuildContext {
  /// Directory page and component sources live in
  pub source_root: PathBuf,

  pub subpackages: SubpackageSet,

  pub options: PluginOptions,

  /// Component tags registered globally by the page-routing declaration
  pub declared_global_tags: HashSet<String>,

  pub runtime_bundle: String,

  pub vendor_bundle: String,

  /// Tag used for placeholders derived automatically
  pub placeholder_tag: String,

  pub template_extension: String,

  pub manifest_extension: String,

  pub script_extension: String,

  /// Name of the root application manifest asset
  pub app_manifest: String,
}

impl Default for BuildContext {
  fn default() -> Self {
    BuildContext {
      source_root: PathBuf::from("src"),
      subpackages: SubpackageSet::default(),
      options: PluginOptions::default(),
      declared_global_tags: HashSet::new(),
      runtime_bundle: String::from("common/runtime"),
      vendor_bundle: String::from("common/vendor"),
      placeholder_tag: String::from("view"),
      template_extension: String::from(".wxml"),
      manifest_extension: String::from(".json"),
      script_extension: String::from(".js"),
      app_manifest: String::from("app.json"),
    }
  }
}

impl BuildContext {
  pub fn policy(&self) -> PlacementPolicy {
    if self.options.strict {
      PlacementPolicy::Strict
    } else {
      PlacementPolicy::Compat
    }
  }

  pub fn classify(&self, name: &str) -> PackageRoot {
    self.subpackages.classify(name)
  }

  /// Bundles every other bundle may depend on regardless of partition.
  pub fn is_shared_bundle(&self, id: &str) -> bool {
    id == self.runtime_bundle || id == self.vendor_bundle
  }

  /// Name of the vendor bundle collecting modules placed in `root`.
  pub fn vendor_bundle_for(&self, root: &PackageRoot) -> String {
    match root {
      PackageRoot::Main => self.vendor_bundle.clone(),
      PackageRoot::Subpackage(root) => format!("{root}/{}", self.vendor_bundle),
    }
  }
}
