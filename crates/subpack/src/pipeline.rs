use std::fmt::Display;
use std::fmt::Formatter;

use serde::Serialize;
use subpack_bundling::place_modules;
use subpack_bundling::validate_bundle_graph;
use subpack_bundling::PlacementMap;
use subpack_bundling::SplitChunksOptions;
use subpack_core::diagnostic::Diagnostics;
use subpack_core::result::SubpackError;
use subpack_core::types::AssetTable;
use subpack_core::types::BundleGraph;
use subpack_core::types::ModuleGraph;
use subpack_core::BuildContext;
use subpack_manifest::merge_component_manifests;
use subpack_manifest::patch_app_manifest_asset;
use subpack_manifest::FragmentTable;
use subpack_packager_js::check_stylesheet_runtime;
use subpack_packager_js::rewrite_async_loads;
use tracing::debug;
use tracing::info;
use tracing::instrument;
use tracing::warn;

/// A post-emission build stage, in the order the pipeline runs them.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
  ValidateBundles,
  CheckStylesheetRuntime,
  RewriteAsyncLoads,
  MergeComponentManifests,
  PatchAppManifest,
}

impl Stage {
  pub const ALL: [Stage; 5] = [
    Stage::ValidateBundles,
    Stage::CheckStylesheetRuntime,
    Stage::RewriteAsyncLoads,
    Stage::MergeComponentManifests,
    Stage::PatchAppManifest,
  ];

  pub fn name(&self) -> &'static str {
    match self {
      Stage::ValidateBundles => "validate-bundles",
      Stage::CheckStylesheetRuntime => "check-stylesheet-runtime",
      Stage::RewriteAsyncLoads => "rewrite-async-loads",
      Stage::MergeComponentManifests => "merge-component-manifests",
      Stage::PatchAppManifest => "patch-app-manifest",
    }
  }
}

impl Display for Stage {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.name())
  }
}

/// What the host bundler hands over once bundles are emitted.
#[derive(Clone, Copy, Debug)]
pub struct StageInput<'a> {
  pub bundle_graph: &'a BundleGraph,
  pub fragments: &'a FragmentTable,
}

/// Outcome of a pipeline run.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
  pub completed: Vec<Stage>,
  /// The stage that recorded fatal diagnostics, if any
  pub halted_at: Option<Stage>,
  pub diagnostics: Diagnostics,
}

impl BuildReport {
  pub fn is_success(&self) -> bool {
    self.diagnostics.is_empty()
  }

  /// Report of a build that failed before any stage ran, e.g. on a broken config.
  pub fn from_error(error: anyhow::Error) -> Self {
    BuildReport {
      diagnostics: SubpackError::from(error).into_diagnostics(),
      ..BuildReport::default()
    }
  }

  pub fn exit_code(&self) -> i32 {
    if self.is_success() {
      0
    } else {
      1
    }
  }
}

/// Placement output consumed by the host bundler before emission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementReport {
  pub split_chunks: SplitChunksOptions,
  pub placements: PlacementMap,
}

/// The ordered list of post-emission stages, each of which can be switched off.
#[derive(Clone, Debug, PartialEq)]
pub struct Pipeline {
  stages: Vec<(Stage, bool)>,
}

impl Default for Pipeline {
  fn default() -> Self {
    Pipeline {
      stages: Stage::ALL.iter().map(|stage| (*stage, true)).collect(),
    }
  }
}

impl Pipeline {
  pub fn with_stage(mut self, stage: Stage, enabled: bool) -> Self {
    for entry in self.stages.iter_mut() {
      if entry.0 == stage {
        entry.1 = enabled;
      }
    }
    self
  }

  pub fn enabled_stages(&self) -> impl Iterator<Item = Stage> + '_ {
    self
      .stages
      .iter()
      .filter(|(_, enabled)| *enabled)
      .map(|(stage, _)| *stage)
  }

  /// Pre-emission entry point: decides where every module goes.
  pub fn place(ctx: &BuildContext, module_graph: &ModuleGraph) -> PlacementReport {
    PlacementReport {
      split_chunks: SplitChunksOptions::for_context(ctx),
      placements: place_modules(ctx, module_graph),
    }
  }

  /// Runs the enabled stages over the emitted assets.
  ///
  /// A stage that records diagnostics stops the run once it completes. Assets rewritten
  /// by earlier stages stay rewritten.
  #[instrument(level = "debug", skip_all)]
  pub fn run(
    &self,
    ctx: &BuildContext,
    input: StageInput<'_>,
    assets: &mut AssetTable,
  ) -> BuildReport {
    let mut report = BuildReport::default();

    for stage in self.enabled_stages() {
      let diagnostics = run_stage(stage, ctx, input, assets);
      report.completed.push(stage);

      if !diagnostics.is_empty() {
        warn!(
          stage = stage.name(),
          diagnostics = diagnostics.len(),
          "pipeline: stage failed"
        );
        report.diagnostics.extend(diagnostics);
        report.halted_at = Some(stage);
        break;
      }

      debug!(stage = stage.name(), "pipeline: stage completed");
    }

    info!(
      stages = report.completed.len(),
      diagnostics = report.diagnostics.len(),
      "pipeline: finished"
    );

    report
  }
}

fn run_stage(
  stage: Stage,
  ctx: &BuildContext,
  input: StageInput<'_>,
  assets: &mut AssetTable,
) -> Diagnostics {
  match stage {
    Stage::ValidateBundles => validate_bundle_graph(ctx, input.bundle_graph),
    Stage::CheckStylesheetRuntime => check_stylesheet_runtime(ctx, assets),
    Stage::RewriteAsyncLoads => rewrite_async_loads(ctx, assets),
    Stage::MergeComponentManifests => merge_component_manifests(ctx, assets, input.fragments),
    Stage::PatchAppManifest => {
      patch_app_manifest_asset(ctx, assets);
      Diagnostics::default()
    }
  }
}
