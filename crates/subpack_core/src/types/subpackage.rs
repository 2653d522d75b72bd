use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::path::is_under;

/// A page declared by a subpackage, either as a bare path or a route object.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PageEntry {
  Path(String),
  Route(PageRoute),
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PageRoute {
  pub path: String,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl PageEntry {
  pub fn path(&self) -> &str {
    match self {
      PageEntry::Path(path) => path,
      PageEntry::Route(route) => &route.path,
    }
  }
}

/// A declared subpackage. Fields other than `root`, `independent` and `pages` are kept as-is.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subpackage {
  #[serde(default)]
  pub root: String,

  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub independent: bool,

  #[serde(default)]
  pub pages: Vec<PageEntry>,

  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl Subpackage {
  pub fn new(root: impl Into<String>) -> Self {
    Subpackage {
      root: root.into(),
      ..Subpackage::default()
    }
  }

  pub fn independent(mut self) -> Self {
    self.independent = true;
    self
  }

  pub fn with_page(mut self, page: impl Into<String>) -> Self {
    self.pages.push(PageEntry::Path(page.into()));
    self
  }
}

/// The partition a module, bundle or component belongs to.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum PackageRoot {
  Main,
  Subpackage(String),
}

impl PackageRoot {
  pub fn is_main(&self) -> bool {
    matches!(self, PackageRoot::Main)
  }
}

impl Display for PackageRoot {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      PackageRoot::Main => f.write_str("__main__"),
      PackageRoot::Subpackage(root) => f.write_str(root),
    }
  }
}

/// The subpackages declared for a build, in declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubpackageSet {
  subpackages: Vec<Subpackage>,
}

impl From<Vec<Subpackage>> for SubpackageSet {
  fn from(subpackages: Vec<Subpackage>) -> Self {
    SubpackageSet::new(subpackages)
  }
}

impl SubpackageSet {
  pub fn new(subpackages: Vec<Subpackage>) -> Self {
    let subpackages = subpackages
      .into_iter()
      .map(|mut subpackage| {
        subpackage.root = subpackage.root.trim_end_matches('/').to_string();
        subpackage
      })
      .filter(|subpackage| !subpackage.root.is_empty())
      .collect();

    SubpackageSet { subpackages }
  }

  pub fn iter(&self) -> impl Iterator<Item = &Subpackage> {
    self.subpackages.iter()
  }

  pub fn roots(&self) -> impl Iterator<Item = &str> {
    self.subpackages.iter().map(|s| s.root.as_str())
  }

  pub fn get(&self, root: &str) -> Option<&Subpackage> {
    self.subpackages.iter().find(|s| s.root == root)
  }

  pub fn is_empty(&self) -> bool {
    self.subpackages.is_empty()
  }

  /// Longest declared root that `name` lives under.
  pub fn matching(&self, name: &str) -> Option<&Subpackage> {
    self
      .subpackages
      .iter()
      .filter(|s| is_under(name, &s.root))
      .max_by_key(|s| s.root.len())
  }

  pub fn classify(&self, name: &str) -> PackageRoot {
    match self.matching(name) {
      Some(subpackage) => PackageRoot::Subpackage(subpackage.root.clone()),
      None => PackageRoot::Main,
    }
  }

  /// Longest root that `name` lives under, skipping independent subpackages.
  pub fn matching_normal(&self, name: &str) -> Option<&Subpackage> {
    self
      .subpackages
      .iter()
      .filter(|s| !s.independent && is_under(name, &s.root))
      .max_by_key(|s| s.root.len())
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn classifies_by_longest_prefix() {
    let set = SubpackageSet::new(vec![
      Subpackage::new("pkg"),
      Subpackage::new("pkg/deep/"),
      Subpackage::new(""),
    ]);

    assert_eq!(set.classify("pkg/a.js"), PackageRoot::Subpackage("pkg".into()));
    assert_eq!(
      set.classify("pkg/deep/common/vendor"),
      PackageRoot::Subpackage("pkg/deep".into())
    );
    assert_eq!(set.classify("pkgx/a.js"), PackageRoot::Main);
    assert_eq!(set.classify("common/vendor"), PackageRoot::Main);
    assert_eq!(set.roots().count(), 2);
  }

  #[test]
  fn normal_matching_skips_independent_roots() {
    let set = SubpackageSet::new(vec![
      Subpackage::new("pkg"),
      Subpackage::new("pkg/solo").independent(),
    ]);

    assert_eq!(
      set.matching("pkg/solo/a.js").map(|s| s.root.as_str()),
      Some("pkg/solo")
    );
    assert_eq!(
      set.matching_normal("pkg/solo/a.js").map(|s| s.root.as_str()),
      Some("pkg")
    );
    assert_eq!(set.matching_normal("solo/a.js"), None);
  }

  #[test]
  fn reads_page_entries_in_both_shapes() {
    let subpackage: Subpackage = serde_json::from_str(
      r#"{ "root": "subA", "pages": ["p", { "path": "q", "style": {} }], "name": "a" }"#,
    )
    .unwrap();

    assert_eq!(
      subpackage.pages.iter().map(PageEntry::path).collect::<Vec<_>>(),
      vec!["p", "q"]
    );
    assert_eq!(subpackage.extra.get("name"), Some(&Value::from("a")));
    assert!(!subpackage.independent);
  }
}
