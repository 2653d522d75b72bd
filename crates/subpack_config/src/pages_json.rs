use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;
use subpack_core::types::PageEntry;
use subpack_core::types::Subpackage;

/// The page routing declaration (`pages.json`). Only the fields the build stages read
/// are modelled.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PagesJson {
  pub pages: Vec<PageEntry>,
  pub sub_packages: Vec<Subpackage>,
  pub global_style: GlobalStyle,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalStyle {
  pub using_components: Map<String, Value>,
}

impl PagesJson {
  /// Component tags registered for every page.
  pub fn global_tags(&self) -> HashSet<String> {
    self.global_style.using_components.keys().cloned().collect()
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn reads_json5_declarations() {
    let pages: PagesJson = serde_json5::from_str(
      r#"{
        // routes
        pages: [{ path: 'pages/index/index', style: {} }],
        subPackages: [
          { root: 'subA', pages: ['p'] },
          { root: 'subB', independent: true, name: 'b' },
        ],
        globalStyle: { usingComponents: { 'app-loading': '/components/loading' } },
      }"#,
    )
    .unwrap();

    assert_eq!(pages.pages[0].path(), "pages/index/index");
    assert_eq!(pages.sub_packages.len(), 2);
    assert!(pages.sub_packages[1].independent);
    assert!(pages.sub_packages[1].pages.is_empty());
    assert_eq!(
      pages.sub_packages[1].extra.get("name"),
      Some(&Value::from("b"))
    );
    assert_eq!(pages.global_tags(), HashSet::from([String::from("app-loading")]));
  }
}
