use serde::Deserialize;
use serde::Serialize;

use super::ModuleId;

pub type BundleId = String;

/// A named output unit produced by the host bundler.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
  pub id: BundleId,

  #[serde(default)]
  pub name: Option<String>,

  #[serde(default)]
  pub modules: Vec<ModuleId>,

  /// True for the bundle carrying the module runtime (the application entry)
  #[serde(default)]
  pub has_runtime: bool,

  /// Bundles that must be loaded before this one executes
  #[serde(default)]
  pub dependencies: Vec<BundleId>,

  #[serde(default)]
  pub prefetch: Vec<BundleId>,
}

impl Bundle {
  pub fn new(id: impl Into<BundleId>) -> Self {
    let id = id.into();
    Bundle {
      name: Some(id.clone()),
      id,
      ..Bundle::default()
    }
  }

  pub fn with_dependency(mut self, id: impl Into<BundleId>) -> Self {
    self.dependencies.push(id.into());
    self
  }

  pub fn with_prefetch(mut self, id: impl Into<BundleId>) -> Self {
    self.prefetch.push(id.into());
    self
  }

  pub fn with_runtime(mut self) -> Self {
    self.has_runtime = true;
    self
  }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BundleGraph {
  bundles: Vec<Bundle>,
}

impl From<Vec<Bundle>> for BundleGraph {
  fn from(bundles: Vec<Bundle>) -> Self {
    BundleGraph { bundles }
  }
}

impl BundleGraph {
  pub fn bundles(&self) -> impl Iterator<Item = &Bundle> {
    self.bundles.iter()
  }

  pub fn get(&self, id: &str) -> Option<&Bundle> {
    self.bundles.iter().find(|bundle| bundle.id == id)
  }
}
