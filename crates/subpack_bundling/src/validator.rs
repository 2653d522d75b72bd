use std::collections::BTreeSet;

use subpack_core::diagnostic::Diagnostic;
use subpack_core::diagnostic::Diagnostics;
use subpack_core::diagnostic::ErrorKind;
use subpack_core::types::Bundle;
use subpack_core::types::BundleGraph;
use subpack_core::BuildContext;
use tracing::debug;
use tracing::instrument;

const ORIGIN: &str = "validate-bundles";

/// Checks the finished bundle graph for cross subpackage dependencies and prefetching.
///
/// Every violation is reported; the graph itself is never changed.
#[instrument(level = "debug", skip_all)]
pub fn validate_bundle_graph(ctx: &BuildContext, bundle_graph: &BundleGraph) -> Diagnostics {
  let mut diagnostics = Diagnostics::default();

  for bundle in bundle_graph.bundles() {
    if bundle.has_runtime {
      continue;
    }

    check_dependencies(ctx, bundle, &mut diagnostics);
    check_prefetch(bundle, &mut diagnostics);
  }

  debug!(
    diagnostics = diagnostics.len(),
    "validate-bundles: bundle graph checked"
  );

  diagnostics
}

fn check_dependencies(ctx: &BuildContext, bundle: &Bundle, diagnostics: &mut Diagnostics) {
  let root = ctx.classify(&bundle.id);

  let dependencies = bundle
    .dependencies
    .iter()
    .filter(|id| **id != bundle.id && !ctx.is_shared_bundle(id))
    .collect::<BTreeSet<_>>();

  for dependency in dependencies {
    if ctx.classify(dependency) == root {
      continue;
    }

    diagnostics.push(
      Diagnostic::new(
        ErrorKind::CrossSubpackageDependency,
        format!(
          "The bundle is not allowed to have cross subpackage dependencies, \"{}\" -> \"{}\"",
          bundle.id, dependency
        ),
      )
      .with_origin(ORIGIN)
      .with_subject(bundle.id.clone())
      .with_subject(dependency.clone()),
    );
  }
}

fn check_prefetch(bundle: &Bundle, diagnostics: &mut Diagnostics) {
  if bundle.prefetch.is_empty() {
    return;
  }

  let list = bundle
    .prefetch
    .iter()
    .map(|id| format!("\"{id}\""))
    .collect::<Vec<_>>()
    .join(", ");

  diagnostics.push(
    Diagnostic::new(
      ErrorKind::Prefetch,
      format!(
        "Prefetch is not supported by the host, \
         but prefetch bundles found [{list}] in bundle \"{}\"",
        bundle.id
      ),
    )
    .with_origin(ORIGIN)
    .with_subject(bundle.id.clone()),
  );
}
