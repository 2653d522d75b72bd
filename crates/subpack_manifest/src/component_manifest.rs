use serde_json::Map;
use serde_json::Value;
use subpack_core::diagnostic::Diagnostic;
use subpack_core::diagnostic::Diagnostics;
use subpack_core::diagnostic::ErrorKind;
use subpack_core::path::dirname;
use subpack_core::path::join;
use subpack_core::path::normalize;
use subpack_core::types::AssetTable;
use subpack_core::types::PackageRoot;
use subpack_core::BuildContext;
use tracing::debug;
use tracing::instrument;

use crate::builtin_tags::is_global_tag;
use crate::fragments::ComponentFragment;
use crate::fragments::FragmentTable;

const ORIGIN: &str = "merge-component-manifests";
const USING_COMPONENTS: &str = "usingComponents";
const COMPONENT_PLACEHOLDER: &str = "componentPlaceholder";

/// Distribution path of a `usingComponents` value as seen from `component_dir`.
fn resolve_component(value: &str, component_dir: &str) -> String {
  match value.strip_prefix('/') {
    Some(absolute) => absolute.to_string(),
    None => normalize(&join(component_dir, value)),
  }
}

fn string_entries(manifest: &Map<String, Value>, key: &str) -> Vec<(String, String)> {
  manifest
    .get(key)
    .and_then(Value::as_object)
    .map(|entries| {
      entries
        .iter()
        .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
        .collect()
    })
    .unwrap_or_default()
}

/// Shallow merges `entries` into the object at `manifest[key]`; later entries win.
fn merge_entries<'a>(
  manifest: &mut Map<String, Value>,
  key: &str,
  entries: impl IntoIterator<Item = (&'a String, &'a String)>,
) {
  let target = manifest
    .entry(key)
    .or_insert_with(|| Value::Object(Map::new()));

  if !target.is_object() {
    *target = Value::Object(Map::new());
  }

  if let Value::Object(target) = target {
    for (k, v) in entries {
      target.insert(k.clone(), Value::String(v.clone()));
    }
  }
}

/// Merges auto placeholders and the declared fragment into one component manifest.
///
/// Returns `Ok(None)` when the merged manifest equals `source`, and the serialized
/// manifest otherwise. `emitted` reports whether a component was built, given its
/// distribution path.
pub fn merge_component_manifest(
  ctx: &BuildContext,
  component: &str,
  source: &str,
  fragment: Option<&ComponentFragment>,
  emitted: impl Fn(&str) -> bool,
) -> Result<Option<String>, Diagnostics> {
  let parsed: Value = serde_json::from_str(source).map_err(|error| {
    Diagnostics::from(
      Diagnostic::new(
        ErrorKind::ParseError,
        format!("Failed to parse the manifest of component \"{component}\": {error}"),
      )
      .with_origin(ORIGIN)
      .with_subject(component),
    )
  })?;

  let Value::Object(original) = parsed else {
    return Err(Diagnostics::from(
      Diagnostic::new(
        ErrorKind::ParseError,
        format!("The manifest of component \"{component}\" is not an object"),
      )
      .with_origin(ORIGIN)
      .with_subject(component),
    ));
  };

  let component_dir = dirname(component);
  let root = ctx.classify(component);
  let crosses = |target: &PackageRoot| *target != root && !target.is_main();

  let auto_placeholders = string_entries(&original, USING_COMPONENTS)
    .into_iter()
    .filter(|(_, path)| crosses(&ctx.classify(&resolve_component(path, component_dir))))
    .map(|(key, _)| (key, ctx.placeholder_tag.clone()))
    .collect::<Vec<_>>();

  let mut manifest = original.clone();

  if !auto_placeholders.is_empty() {
    debug!(
      component,
      placeholders = ?auto_placeholders,
      "merge-component-manifests: auto placeholders derived"
    );
    merge_entries(
      &mut manifest,
      COMPONENT_PLACEHOLDER,
      auto_placeholders.iter().map(|(k, v)| (k, v)),
    );
  }

  if let Some(fragment) = fragment {
    if !fragment.using_components.is_empty() {
      merge_entries(&mut manifest, USING_COMPONENTS, &fragment.using_components);
    }
    if !fragment.component_placeholder.is_empty() {
      merge_entries(
        &mut manifest,
        COMPONENT_PLACEHOLDER,
        &fragment.component_placeholder,
      );
    }
  }

  if manifest == original {
    return Ok(None);
  }

  let using_components = string_entries(&manifest, USING_COMPONENTS);
  let mut diagnostics = Diagnostics::default();

  for (key, tag) in string_entries(&manifest, COMPONENT_PLACEHOLDER) {
    let violation = |kind: ErrorKind, prefix: &str| {
      Diagnostic::new(
        kind,
        format!("{prefix} componentPlaceholder \"{key}: {tag}\" in component \"{component}\""),
      )
      .with_origin(ORIGIN)
      .with_subject(component)
      .with_subject(key.clone())
    };

    let Some((_, using)) = using_components.iter().find(|(k, _)| *k == tag) else {
      if !is_global_tag(ctx, &tag) {
        diagnostics.push(violation(ErrorKind::InvalidPlaceholder, "Invalid"));
      }
      continue;
    };

    let target = resolve_component(using, component_dir);

    if crosses(&ctx.classify(&target)) {
      diagnostics.push(violation(
        ErrorKind::CrossSubpackagePlaceholder,
        "Across sub-package",
      ));
      continue;
    }

    if !emitted(&target) {
      diagnostics.push(violation(
        ErrorKind::MissingPlaceholderTarget,
        "Not exist",
      ));
    }
  }

  if !diagnostics.is_empty() {
    return Err(diagnostics);
  }

  serde_json::to_string_pretty(&Value::Object(manifest))
    .map(Some)
    .map_err(|error| {
      Diagnostics::from(
        Diagnostic::new(ErrorKind::Unknown, error.to_string())
          .with_origin(ORIGIN)
          .with_subject(component),
      )
    })
}

/// Runs [`merge_component_manifest`] for every emitted component and replaces the
/// manifests that changed.
///
/// Components are discovered from emitted templates; a component without a manifest
/// asset is skipped.
#[instrument(level = "debug", skip_all)]
pub fn merge_component_manifests(
  ctx: &BuildContext,
  assets: &mut AssetTable,
  fragments: &FragmentTable,
) -> Diagnostics {
  let mut diagnostics = Diagnostics::default();
  let mut replacements = Vec::new();

  {
    let emitted =
      |component: &str| assets.contains(&format!("{component}{}", ctx.template_extension));

    let components = assets
      .names()
      .filter_map(|name| name.strip_suffix(ctx.template_extension.as_str()))
      .collect::<Vec<_>>();

    for component in components {
      let manifest_name = format!("{component}{}", ctx.manifest_extension);
      let Some(source) = assets.source(&manifest_name) else {
        continue;
      };

      let fragment = fragments.get(component);
      match merge_component_manifest(ctx, component, &source, fragment, &emitted) {
        Ok(Some(merged)) => replacements.push((manifest_name, merged)),
        Ok(None) => {}
        Err(errors) => diagnostics.extend(errors),
      }
    }
  }

  for (name, merged) in replacements {
    debug!(asset = name, "merge-component-manifests: manifest replaced");
    assets.replace(&name, merged);
  }

  diagnostics
}
