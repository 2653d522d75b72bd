use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;
use subpack_core::diagnostic::Diagnostic;
use subpack_core::diagnostic::DiagnosticBuilder;
use subpack_core::diagnostic::ErrorKind;
use subpack_core::diagnostic_error;
use subpack_core::path::join;
use tracing::debug;

/// Async loading config declared for one component.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComponentFragment {
  pub using_components: IndexMap<String, String>,
  pub component_placeholder: IndexMap<String, String>,
}

/// Declared fragments keyed by component distribution path, e.g. `subA/components/card`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FragmentTable {
  fragments: BTreeMap<String, ComponentFragment>,
}

impl FragmentTable {
  pub fn builder() -> FragmentTableBuilder {
    FragmentTableBuilder::default()
  }

  pub fn get(&self, component: &str) -> Option<&ComponentFragment> {
    self.fragments.get(component)
  }

  pub fn len(&self) -> usize {
    self.fragments.len()
  }

  pub fn is_empty(&self) -> bool {
    self.fragments.is_empty()
  }

  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.fragments.keys().map(String::as_str)
  }
}

/// Collects fragment files. Keys declared by more than one file are reported together
/// when the table is finished.
#[derive(Debug, Default)]
pub struct FragmentTableBuilder {
  fragments: BTreeMap<String, ComponentFragment>,
  declared_in: BTreeMap<String, Vec<String>>,
}

impl FragmentTableBuilder {
  /// Adds the fragments of one declaration file.
  ///
  /// `dist_dir` is the directory of the file relative to the source root; `file` is only
  /// used in diagnostics.
  pub fn add_file(&mut self, dist_dir: &str, file: &str, contents: &str) -> anyhow::Result<()> {
    let entries: IndexMap<String, ComponentFragment> =
      serde_json::from_str(contents).map_err(|error| {
        diagnostic_error!(DiagnosticBuilder::default()
          .kind(ErrorKind::ParseError)
          .message(format!("Failed to parse component fragment: {error}"))
          .origin("load-fragments")
          .subjects(vec![file.to_string()]))
      })?;

    for (local_key, fragment) in entries {
      let component = join(dist_dir, &local_key);

      debug!(component, file, "fragments: component declared");

      self
        .declared_in
        .entry(component.clone())
        .or_default()
        .push(file.to_string());
      self.fragments.insert(component, fragment);
    }

    Ok(())
  }

  pub fn finish(self) -> Result<FragmentTable, Diagnostic> {
    let duplicates = self
      .declared_in
      .into_iter()
      .filter(|(_, files)| files.len() > 1)
      .collect::<Vec<_>>();

    if duplicates.is_empty() {
      return Ok(FragmentTable {
        fragments: self.fragments,
      });
    }

    let components = duplicates
      .iter()
      .map(|(component, _)| format!("\"{component}\""))
      .collect::<Vec<_>>()
      .join(", ");

    Err(
      DiagnosticBuilder::default()
        .kind(ErrorKind::DuplicateFragment)
        .message(format!(
          "Duplicate component defined in async.component.json: {components}"
        ))
        .origin("load-fragments")
        .subjects(
          duplicates
            .iter()
            .map(|(component, _)| component.clone())
            .collect::<Vec<_>>(),
        )
        .hints(
          duplicates
            .iter()
            .map(|(component, files)| format!("{component} is declared in {}", files.join(", ")))
            .collect::<Vec<_>>(),
        )
        .build(),
    )
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  const CARD: &str = r#"{
    "card": {
      "usingComponents": { "chart": "/subB/chart" },
      "componentPlaceholder": { "chart": "view" }
    },
    "list": {}
  }"#;

  #[test]
  fn keys_fragments_by_distribution_path() {
    let mut builder = FragmentTable::builder();
    builder
      .add_file("subA/components", "subA/components/async.component.json", CARD)
      .unwrap();
    builder
      .add_file("", "async.component.json", r#"{ "root-card": {} }"#)
      .unwrap();

    let table = builder.finish().unwrap();

    assert_eq!(
      table.keys().collect::<Vec<_>>(),
      vec!["root-card", "subA/components/card", "subA/components/list"]
    );
    assert_eq!(
      table
        .get("subA/components/card")
        .map(|f| f.component_placeholder.get("chart").cloned()),
      Some(Some(String::from("view")))
    );
  }

  #[test]
  fn reports_every_duplicate_key() {
    let mut builder = FragmentTable::builder();
    builder.add_file("a", "a/async.component.json", CARD).unwrap();
    builder.add_file("a", "a/other/../async.component.json", CARD).unwrap();

    let diagnostic = builder.finish().unwrap_err();

    assert_eq!(diagnostic.kind, ErrorKind::DuplicateFragment);
    assert_eq!(
      diagnostic.subjects,
      vec![String::from("a/card"), String::from("a/list")]
    );
  }

  #[test]
  fn rejects_malformed_files() {
    let mut builder = FragmentTable::builder();
    let error = builder
      .add_file("a", "a/async.component.json", "{ nope")
      .unwrap_err();

    assert_eq!(
      error.downcast_ref::<Diagnostic>().map(|d| d.kind),
      Some(ErrorKind::ParseError)
    );
  }
}
