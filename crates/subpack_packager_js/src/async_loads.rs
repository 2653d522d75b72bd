use once_cell::sync::Lazy;
use regex::Captures;
use regex::Regex;
use subpack_core::diagnostic::Diagnostic;
use subpack_core::diagnostic::Diagnostics;
use subpack_core::diagnostic::ErrorKind;
use subpack_core::types::AssetTable;
use subpack_core::BuildContext;
use tracing::debug;
use tracing::instrument;

pub const MARKER_PREFIX: &str = "__subpack_";
pub const REQUIRE_ASYNC_MARKER: &str = "__subpack_require_async__";
pub const REMOVE_BEGIN_MARKER: &str = "__subpack_remove_begin__";
pub const REMOVE_END_MARKER: &str = "__subpack_remove_end__";

const NATIVE_REQUIRE_ASYNC: &str = "require.async";
const ORIGIN: &str = "rewrite-async-loads";

static REQUIRE_ASYNC_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r#"__subpack_require_async__\((?P<comment>/\*.+?\*/\s?)?"(?P<id>.+?)"\)"#).unwrap()
});

static REMOVE_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(concat!(
    r"\{(?P<body>\s*__subpack_remove_begin__",
    r"[\s\S]*?__subpack_remove_end__;?\s*)\}"
  ))
  .unwrap()
});

/// Path of bundle `id` relative to the directory of `asset`.
///
/// One `../` per directory level of the asset, followed by the bundle id and the script
/// extension, e.g. `pages/home/index.js` + `common/vendor` gives `../../common/vendor.js`.
pub fn relative_bundle_path(asset: &str, id: &str, extension: &str) -> String {
  let depth = asset.split('/').count() - 1;
  format!("{}{id}{extension}", "../".repeat(depth))
}

/// Rewrites load markers in every emitted script into host relative async loads and
/// removes dead code regions.
///
/// Assets without markers are not touched. An asset that still contains a marker
/// afterwards is reported and left unmodified.
#[instrument(level = "debug", skip_all)]
pub fn rewrite_async_loads(ctx: &BuildContext, assets: &mut AssetTable) -> Diagnostics {
  let mut diagnostics = Diagnostics::default();
  let mut rewritten = Vec::new();

  for (name, _) in assets.iter() {
    if !name.ends_with(&ctx.script_extension) {
      continue;
    }

    let Some(source) = assets.source(name) else {
      continue;
    };

    if !source.contains(MARKER_PREFIX) {
      continue;
    }

    let output = rewrite_source(ctx, name, &source);

    if output.contains(MARKER_PREFIX) {
      diagnostics.push(
        Diagnostic::new(
          ErrorKind::LeftoverMarker,
          format!("Failed to replace {MARKER_PREFIX} markers in \"{name}\""),
        )
        .with_origin(ORIGIN)
        .with_subject(name),
      );
      continue;
    }

    debug!(asset = name, "rewrite-async-loads: asset rewritten");
    rewritten.push((name.to_string(), output));
  }

  for (name, output) in rewritten {
    assets.replace(&name, output);
  }

  diagnostics
}

fn rewrite_source(ctx: &BuildContext, asset: &str, source: &str) -> String {
  let loads = REQUIRE_ASYNC_RE.replace_all(source, |captures: &Captures<'_>| {
    let comment = captures.name("comment").map_or("", |c| c.as_str());
    let id = &captures["id"];
    format!(
      "{NATIVE_REQUIRE_ASYNC}({comment}\"{}\")",
      relative_bundle_path(asset, id, &ctx.script_extension)
    )
  });

  REMOVE_RE.replace_all(&loads, "{}").into_owned()
}
