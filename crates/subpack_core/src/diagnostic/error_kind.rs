use serde::Deserialize;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
  /// A bundle depends on a bundle placed in another subpackage
  CrossSubpackageDependency,
  /// A bundle declares prefetch children
  Prefetch,
  /// An internal marker survived the async load rewrite
  LeftoverMarker,
  /// A placeholder points to a tag that is neither used nor global
  InvalidPlaceholder,
  /// A placeholder points to a component in another subpackage
  CrossSubpackagePlaceholder,
  /// A placeholder points to a component that was never emitted
  MissingPlaceholderTarget,
  /// The same component is declared by two fragment files
  DuplicateFragment,
  /// DOM stylesheet loading code was found in the runtime
  StylesheetRuntime,
  ParseError,
  NotFound,
  #[default]
  Unknown,
}
