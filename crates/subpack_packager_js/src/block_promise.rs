use serde_json::Value;
use subpack_core::types::BundleGraph;
use subpack_core::types::BundleId;

use crate::async_loads::REQUIRE_ASYNC_MARKER;

/// An on-demand load site, e.g. a dynamic `import()`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AsyncBlock {
  pub chunk_name: Option<String>,
  pub chunk_reason: Option<String>,
  /// Bundles that must be loaded before the block resolves
  pub bundles: Vec<BundleId>,
  /// Bundles holding the module that contains this load site
  pub origin_bundles: Vec<BundleId>,
}

/// Renders the expression that loads the bundles required by `block`.
///
/// Bundles carrying the runtime are always resident and are never loaded. The load
/// calls are emitted as markers and resolved to host paths by
/// [`rewrite_async_loads`](crate::rewrite_async_loads) once bundle ids are final.
pub fn render_block_promise(
  block: &AsyncBlock,
  bundle_graph: &BundleGraph,
  message: &str,
) -> String {
  let bundles = block
    .bundles
    .iter()
    .filter(|id| {
      !bundle_graph
        .get(id)
        .is_some_and(|bundle| bundle.has_runtime)
    })
    .collect::<Vec<_>>();

  let comment = comment(&[
    Some(message),
    block.chunk_name.as_deref(),
    block.chunk_reason.as_deref(),
  ]);

  match bundles.as_slice() {
    [] => format!("Promise.resolve({})", comment.trim()),
    [only] if block.origin_bundles.len() == 1 && block.origin_bundles[0] == **only => {
      format!("Promise.resolve({})", comment.trim())
    }
    [only] => format!("{REQUIRE_ASYNC_MARKER}({comment}{})", quote(only)),
    many => format!(
      "Promise.all({}[{}])",
      comment.trim(),
      many
        .iter()
        .map(|id| format!("{REQUIRE_ASYNC_MARKER}({})", quote(id)))
        .collect::<Vec<_>>()
        .join(", ")
    ),
  }
}

fn quote(id: &str) -> String {
  Value::from(id).to_string()
}

/// `/* a | b */ ` or an empty string when there is nothing to say.
fn comment(items: &[Option<&str>]) -> String {
  let content = items
    .iter()
    .flatten()
    .filter(|item| !item.is_empty())
    .copied()
    .collect::<Vec<_>>()
    .join(" | ");

  if content.is_empty() {
    return String::new();
  }

  format!("/* {} */ ", content.replace("*/", "* /"))
}
