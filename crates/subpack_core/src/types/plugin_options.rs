use serde::Deserialize;
use serde::Serialize;

use super::Subpackage;

/// Operator supplied options for the manifest and placement stages.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginOptions {
  /// Extra subpackages appended to the root manifest, e.g. natively written ones
  pub append_sub_packages: Vec<Subpackage>,

  /// Globally registered components to drop from the root manifest
  pub delete_components: Vec<String>,

  /// `None` leaves the flag alone, an empty string clears it
  pub lazy_code_loading: Option<String>,

  /// Use the path-only placement policy
  pub strict: bool,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn distinguishes_absent_and_empty_lazy_loading() {
    let absent: PluginOptions = serde_json::from_str("{}").unwrap();
    let empty: PluginOptions = serde_json::from_str(r#"{ "lazyCodeLoading": "" }"#).unwrap();

    assert_eq!(absent.lazy_code_loading, None);
    assert_eq!(empty.lazy_code_loading, Some(String::new()));
  }
}
