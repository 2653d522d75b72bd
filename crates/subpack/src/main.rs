use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use subpack::dist::load_assets;
use subpack::dist::write_changed_assets;
use subpack::graph_input::BuildGraph;
use subpack::source_patch::builtin_patches;
use subpack::BuildReport;
use subpack::Pipeline;
use subpack::StageInput;
use subpack_config::ConfigLoader;
use subpack_filesystem::os_file_system::OsFileSystem;
use subpack_filesystem::FileSystemRef;
use subpack_monitoring::MonitoringOptions;
use subpack_monitoring::TracerMode;
use tracing::error;
use tracing::info;
use tracing::warn;

#[derive(Parser)]
struct Args {
  /// Project root holding `src/pages.json` and the optional `subpack.config.json5`
  #[arg(short, long, default_value = ".")]
  project_root: PathBuf,

  /// Output directory of the host build
  #[arg(short, long)]
  dist: PathBuf,

  /// Module and bundle graphs exported by the host bundler
  #[arg(short, long)]
  graph: PathBuf,

  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Use the path-only placement policy
  #[arg(long)]
  strict: bool,

  /// Write the placement decisions and split grouping to this file
  #[arg(long)]
  placements: Option<PathBuf>,

  /// Patch the framework's dynamic component import before building
  #[arg(long)]
  patch_framework: bool,

  /// Fail when a framework patch no longer applies
  #[arg(long)]
  strict_patch: bool,
}

fn main() {
  initialize_tracing();

  let args = Args::parse();
  let code = run(args).unwrap_or_else(|e| {
    error!("Failed to run subpack: {:#}", e);
    1
  });

  std::process::exit(code);
}

fn run(args: Args) -> anyhow::Result<i32> {
  let fs: FileSystemRef = Arc::new(OsFileSystem);

  let loaded = match ConfigLoader::new(fs.clone(), args.project_root.clone())
    .load(args.config.as_deref(), args.strict.then_some(true))
  {
    Ok(loaded) => loaded,
    Err(error) => return Ok(report_diagnostics(BuildReport::from_error(error))),
  };
  let ctx = loaded.ctx;

  if args.patch_framework {
    for patch in builtin_patches()? {
      patch.apply(&*fs, &args.project_root, args.strict_patch)?;
    }
  }

  let graph = BuildGraph::load(&*fs, &args.graph)?;

  info!("Placing modules");
  let placement = Pipeline::place(&ctx, &graph.modules);
  if let Some(path) = args.placements.as_deref() {
    fs.write(path, serde_json::to_string_pretty(&placement)?.as_bytes())?;
  }

  info!("Running post-emission stages");
  let before = load_assets(&*fs, &args.dist)?;
  let mut assets = before.clone();
  let report = Pipeline::default().run(
    &ctx,
    StageInput {
      bundle_graph: &graph.bundles,
      fragments: &loaded.fragments,
    },
    &mut assets,
  );

  write_changed_assets(&*fs, &args.dist, &before, &assets)?;

  Ok(report_diagnostics(report))
}

fn report_diagnostics(report: BuildReport) -> i32 {
  for diagnostic in report.diagnostics.iter() {
    warn!("{}", diagnostic);
  }

  report.exit_code()
}

fn initialize_tracing() {
  if std::env::var("RUST_LOG").is_err() {
    std::env::set_var("RUST_LOG", "info");
  }
  let mut options = MonitoringOptions::from_env().unwrap();
  if options.tracing_options.is_empty() {
    options.tracing_options.push(TracerMode::Stdout);
  }
  subpack_monitoring::initialize_monitoring(options).unwrap();
}
