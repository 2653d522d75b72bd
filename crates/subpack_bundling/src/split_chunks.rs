use indexmap::IndexMap;
use serde::Serialize;
use subpack_core::types::PackageRoot;
use subpack_core::BuildContext;

const NODE_MODULES_PREFIX: &str = "node-modules";

/// One vendor bundle the host bundler groups placed modules into.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheGroup {
  /// Output bundle name, e.g. `subA/common/vendor`
  pub name: String,
  pub priority: i32,
  /// Ignore size and request limits for this group
  pub enforce: bool,
}

/// Grouping parameters shared by both placement policies.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitChunksOptions {
  pub min_size: usize,
  pub max_size: usize,
  pub min_chunks: usize,
  pub max_async_requests: usize,
  pub max_initial_requests: usize,
  pub automatic_name_delimiter: String,
  pub automatic_name_max_length: usize,
  pub cache_groups: IndexMap<String, CacheGroup>,
}

impl Default for SplitChunksOptions {
  fn default() -> Self {
    SplitChunksOptions {
      min_size: 0,
      max_size: 0,
      min_chunks: 1,
      max_async_requests: 5,
      max_initial_requests: 3,
      automatic_name_delimiter: String::from("~"),
      automatic_name_max_length: 30,
      cache_groups: IndexMap::new(),
    }
  }
}

impl SplitChunksOptions {
  /// Builds the options for a build: one cache group for the main package and one per
  /// declared subpackage, in declaration order.
  pub fn for_context(ctx: &BuildContext) -> Self {
    let mut cache_groups = IndexMap::new();

    cache_groups.insert(
      String::from("commons"),
      CacheGroup {
        name: ctx.vendor_bundle_for(&PackageRoot::Main),
        priority: -20,
        enforce: true,
      },
    );

    for root in ctx.subpackages.roots() {
      let root = PackageRoot::Subpackage(root.to_string());
      cache_groups.insert(
        format!("{root}/commons"),
        CacheGroup {
          name: ctx.vendor_bundle_for(&root),
          priority: 0,
          enforce: true,
        },
      );
    }

    SplitChunksOptions {
      cache_groups,
      ..SplitChunksOptions::default()
    }
  }
}

/// Bundles compiled from third party packages keep their own chunking.
pub fn is_splittable_bundle(name: &str) -> bool {
  !name.starts_with(NODE_MODULES_PREFIX)
}
