use std::collections::HashSet;

use anyhow::anyhow;
use anyhow::Context;
use serde_json::Map;
use serde_json::Value;
use subpack_core::path::is_under;
use subpack_core::types::AssetTable;
use subpack_core::types::Subpackage;
use subpack_core::BuildContext;
use tracing::debug;
use tracing::error;
use tracing::instrument;

const SUB_PACKAGES: &str = "subPackages";
const USING_COMPONENTS: &str = "usingComponents";
const LAZY_CODE_LOADING: &str = "lazyCodeLoading";

/// Manifest entry for a declared subpackage without pages. Every declared field is kept.
fn empty_page_entry(subpackage: &Subpackage) -> Value {
  let mut entry = Map::new();
  entry.insert(String::from("root"), Value::from(subpackage.root.clone()));
  entry.insert(String::from("pages"), Value::Array(Vec::new()));

  if subpackage.independent {
    entry.insert(String::from("independent"), Value::Bool(true));
  }

  for (key, value) in subpackage.extra.iter() {
    entry.insert(key.clone(), value.clone());
  }

  Value::Object(entry)
}

/// Patches the root application manifest.
///
/// Appends configured subpackages and declared subpackages without pages whose root has
/// emitted assets, removes deleted global components and applies the lazy code loading
/// flag. Subpackages already listed are never added twice.
pub fn patch_app_manifest<'a>(
  ctx: &BuildContext,
  source: &str,
  asset_names: impl IntoIterator<Item = &'a str>,
) -> anyhow::Result<String> {
  let mut manifest: Value =
    serde_json::from_str(source).context("Failed to parse the root manifest")?;
  let manifest_object = manifest
    .as_object_mut()
    .ok_or_else(|| anyhow!("The root manifest is not an object"))?;

  let asset_names = asset_names.into_iter().collect::<Vec<_>>();
  let options = &ctx.options;

  let sub_packages = manifest_object
    .entry(SUB_PACKAGES)
    .or_insert_with(|| Value::Array(Vec::new()))
    .as_array_mut()
    .ok_or_else(|| anyhow!("\"{SUB_PACKAGES}\" is not a list"))?;

  let mut listed = sub_packages
    .iter()
    .filter_map(|entry| entry.get("root").and_then(Value::as_str))
    .map(String::from)
    .collect::<HashSet<_>>();

  for subpackage in options.append_sub_packages.iter() {
    if subpackage.root.is_empty() || !listed.insert(subpackage.root.clone()) {
      continue;
    }

    debug!(root = subpackage.root, "patch-app-manifest: subpackage appended");
    sub_packages.push(serde_json::to_value(subpackage)?);
  }

  for subpackage in ctx.subpackages.iter().filter(|s| s.pages.is_empty()) {
    if listed.contains(&subpackage.root) {
      continue;
    }

    let emitted = asset_names
      .iter()
      .any(|name| is_under(name, &subpackage.root));

    if !emitted {
      debug!(
        root = subpackage.root,
        "patch-app-manifest: subpackage without pages has no assets"
      );
      continue;
    }

    debug!(
      root = subpackage.root,
      "patch-app-manifest: subpackage without pages appended"
    );
    listed.insert(subpackage.root.clone());
    sub_packages.push(empty_page_entry(subpackage));
  }

  if let Some(Value::Object(using_components)) = manifest_object.get_mut(USING_COMPONENTS) {
    for name in options.delete_components.iter() {
      using_components.shift_remove(name);
    }
  }

  match options.lazy_code_loading.as_deref() {
    None => {}
    Some("") => {
      manifest_object.shift_remove(LAZY_CODE_LOADING);
    }
    Some(value) => {
      manifest_object.insert(String::from(LAZY_CODE_LOADING), Value::from(value));
    }
  }

  Ok(serde_json::to_string_pretty(&manifest)?)
}

/// Runs [`patch_app_manifest`] on the root manifest asset.
///
/// Failures are logged and leave the asset unmodified. Returns whether the asset changed.
#[instrument(level = "debug", skip_all)]
pub fn patch_app_manifest_asset(ctx: &BuildContext, assets: &mut AssetTable) -> bool {
  let name = ctx.app_manifest.as_str();

  let Some(source) = assets.source(name) else {
    debug!(asset = name, "patch-app-manifest: no root manifest emitted");
    return false;
  };

  match patch_app_manifest(ctx, &source, assets.names()) {
    Ok(patched) => {
      if patched == source {
        return false;
      }
      assets.replace(name, patched)
    }
    Err(err) => {
      error!(
        asset = name,
        error = %format!("{err:#}"),
        "patch-app-manifest: failed to patch the root manifest"
      );
      false
    }
  }
}
