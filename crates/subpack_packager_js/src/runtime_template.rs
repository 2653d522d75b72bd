use subpack_core::diagnostic::Diagnostic;
use subpack_core::diagnostic::Diagnostics;
use subpack_core::diagnostic::ErrorKind;
use subpack_core::types::AssetTable;
use subpack_core::BuildContext;
use tracing::debug;

const SCRIPT_INJECTION: &str = "document.head.appendChild(script);";
const STYLESHEET_LOADER: &str = "document.getElementsByTagName";

fn indent(lines: &[&str], depth: usize) -> Vec<String> {
  lines
    .iter()
    .map(|line| format!("{}{line}", "\t".repeat(depth)))
    .collect()
}

/// Runtime snippet loading bundle `chunkId` through the host `require` primitive.
///
/// Paths are relative to the runtime bundle, which lives one directory below the output
/// root.
pub fn render_load_script(ctx: &BuildContext) -> String {
  let up = "../".repeat(ctx.runtime_bundle.split('/').count() - 1);
  let extension = &ctx.script_extension;

  let mut lines: Vec<String> = vec![
    "// create error before stack unwound to get useful stacktrace later".into(),
    "var error = new Error();".into(),
    "var onScriptComplete = function (event) {".into(),
  ];
  lines.extend(indent(&["var chunk = installedChunks[chunkId];", "if(chunk !== 0) {"], 1));
  lines.extend(indent(&["if(chunk) {"], 2));
  lines.extend(indent(
    &[
      "var errorType = (event && event.type) || 'missing';",
      "var errorMsg = (event && event.errMsg) || 'missing error message';",
      "error.message = 'Loading chunk ' + chunkId + ' failed.\\n' + errorMsg;",
      "error.name = 'ChunkLoadError';",
      "error.type = errorType;",
      "chunk[1](error);",
    ],
    3,
  ));
  lines.extend(indent(&["}", "installedChunks[chunkId] = undefined;"], 2));
  lines.extend(indent(&["}"], 1));
  lines.push("};".into());
  lines.push(format!(
    "require('{up}' + chunkId + '{extension}', function () {{"
  ));
  lines.extend(indent(
    &["onScriptComplete({type: 'callback', errMsg: 'require async OK'});"],
    1,
  ));
  lines.push("}, function (err) {".into());
  lines.extend(indent(
    &["onScriptComplete({type: 'error', errMsg: err && err.errMsg});"],
    1,
  ));
  lines.push("});".into());

  lines.join("\n")
}

/// Removes DOM script injection from the bundler's chunk loading source.
pub fn strip_script_injection(source: &str) -> String {
  source.replacen(SCRIPT_INJECTION, "", 1)
}

/// The runtime bundle must not try to load stylesheets through the DOM.
pub fn check_stylesheet_runtime(ctx: &BuildContext, assets: &AssetTable) -> Diagnostics {
  let name = format!("{}{}", ctx.runtime_bundle, ctx.script_extension);
  let mut diagnostics = Diagnostics::default();

  let Some(source) = assets.source(&name) else {
    debug!(asset = name, "check-stylesheet-runtime: no runtime asset");
    return diagnostics;
  };

  if source.contains(STYLESHEET_LOADER) {
    diagnostics.push(
      Diagnostic::new(
        ErrorKind::StylesheetRuntime,
        format!("\"{name}\" loads stylesheets through the DOM ({STYLESHEET_LOADER})"),
      )
      .with_origin("check-stylesheet-runtime")
      .with_subject(name),
    );
  }

  diagnostics
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn loads_relative_to_the_runtime_bundle() {
    let script = render_load_script(&BuildContext::default());

    assert!(script.contains("require('../' + chunkId + '.js', function () {"));
    assert!(script.contains("\t\t\terror.name = 'ChunkLoadError';"));
    assert!(script.ends_with("});"));
  }

  #[test]
  fn strips_dom_script_injection() {
    assert_eq!(
      strip_script_injection("script.src = url;\ndocument.head.appendChild(script);\nreturn;"),
      "script.src = url;\n\nreturn;"
    );
  }

  #[test]
  fn flags_dom_stylesheet_loading_in_the_runtime() {
    let ctx = BuildContext::default();
    let bad: AssetTable = [(
      "common/runtime.js",
      "var head = document.getElementsByTagName('head')[0];",
    )]
    .into_iter()
    .collect();
    let good: AssetTable = [("common/runtime.js", "require(x);")].into_iter().collect();

    assert_eq!(
      check_stylesheet_runtime(&ctx, &bad).count_kind(ErrorKind::StylesheetRuntime),
      1
    );
    assert!(check_stylesheet_runtime(&ctx, &good).is_empty());
    assert!(check_stylesheet_runtime(&ctx, &AssetTable::new()).is_empty());
  }
}
