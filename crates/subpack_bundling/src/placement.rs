use std::collections::BTreeSet;
use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;
use subpack_core::path::is_under;
use subpack_core::types::Module;
use subpack_core::types::ModuleGraph;
use subpack_core::types::ModuleId;
use subpack_core::types::ModuleKind;
use subpack_core::types::PackageRoot;
use subpack_core::types::ReferenceKind;
use subpack_core::BuildContext;
use subpack_core::PlacementPolicy;
use tracing::debug;
use tracing::instrument;

use crate::split_chunks::is_splittable_bundle;

/// Final location of a module.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "root")]
pub enum Placement {
  /// The main package vendor bundle
  Main,
  /// The vendor bundle of one subpackage
  Subpackage(String),
  /// Not split out; stays in the unit that emits it
  Unsplit,
}

impl Placement {
  pub fn package_root(&self) -> Option<PackageRoot> {
    match self {
      Placement::Main => Some(PackageRoot::Main),
      Placement::Subpackage(root) => Some(PackageRoot::Subpackage(root.clone())),
      Placement::Unsplit => None,
    }
  }
}

/// Why a module ended up where it did. Only used for tracing and debugging.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "reason")]
pub enum PlacementReason {
  NotClassified,
  ThirdPartyBundle,
  OutsideSubpackageRoots,
  UnderSubpackageRoot,
  NoSubpackageConsumer,
  SharedBySubpackages { roots: Vec<String> },
  UsedByMain { bundle: String },
  ReachedFromComponent { component: ModuleId },
  SingleSubpackage,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementDecision {
  pub placement: Placement,
  pub reason: PlacementReason,
}

impl PlacementDecision {
  fn new(placement: Placement, reason: PlacementReason) -> Self {
    PlacementDecision { placement, reason }
  }
}

/// Placement of every module in a graph, in graph order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PlacementMap {
  decisions: IndexMap<ModuleId, PlacementDecision>,
}

impl PlacementMap {
  pub fn get(&self, id: &str) -> Option<&Placement> {
    self.decisions.get(id).map(|decision| &decision.placement)
  }

  pub fn decision(&self, id: &str) -> Option<&PlacementDecision> {
    self.decisions.get(id)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&ModuleId, &Placement)> {
    self
      .decisions
      .iter()
      .map(|(id, decision)| (id, &decision.placement))
  }

  pub fn len(&self) -> usize {
    self.decisions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.decisions.is_empty()
  }

  /// Modules assigned to the vendor bundle of `root`.
  pub fn modules_in(&self, root: &PackageRoot) -> Vec<&str> {
    self
      .decisions
      .iter()
      .filter(|(_, d)| d.placement.package_root().as_ref() == Some(root))
      .map(|(id, _)| id.as_str())
      .collect()
  }
}

/// Assigns a single module to a bundle.
///
/// Implementations must be pure over the graph: they never mutate it and return a
/// decision for every module they are given.
pub trait ModulePlacer: std::fmt::Debug {
  fn place(&self, ctx: &BuildContext, graph: &ModuleGraph, module: &Module) -> PlacementDecision;
}

/// Path-only placement: subpackage sources go to their subpackage, everything else to main.
#[derive(Debug, Default)]
pub struct StrictPlacer;

impl ModulePlacer for StrictPlacer {
  fn place(&self, ctx: &BuildContext, _graph: &ModuleGraph, module: &Module) -> PlacementDecision {
    if !is_classified(module) {
      return PlacementDecision::new(Placement::Unsplit, PlacementReason::NotClassified);
    }

    match module
      .resource
      .as_deref()
      .and_then(|resource| ctx.subpackages.matching(resource))
    {
      Some(subpackage) => PlacementDecision::new(
        Placement::Subpackage(subpackage.root.clone()),
        PlacementReason::UnderSubpackageRoot,
      ),
      None => PlacementDecision::new(Placement::Main, PlacementReason::OutsideSubpackageRoots),
    }
  }
}

/// Graph-aware placement: a module only goes to a subpackage when that subpackage is its
/// sole consumer, and no page or component outside it reaches it synchronously.
#[derive(Debug, Default)]
pub struct CompatPlacer;

impl ModulePlacer for CompatPlacer {
  fn place(&self, ctx: &BuildContext, graph: &ModuleGraph, module: &Module) -> PlacementDecision {
    if !is_classified(module) {
      return PlacementDecision::new(Placement::Unsplit, PlacementReason::NotClassified);
    }

    let consumers = consumer_names(module);

    let roots = consumers
      .iter()
      .filter_map(|name| ctx.subpackages.matching_normal(name))
      .map(|subpackage| subpackage.root.as_str())
      .collect::<BTreeSet<&str>>();

    let root = match roots.len() {
      0 => {
        return PlacementDecision::new(Placement::Main, PlacementReason::NoSubpackageConsumer);
      }
      1 => roots.iter().next().copied().unwrap_or_default(),
      _ => {
        return PlacementDecision::new(
          Placement::Main,
          PlacementReason::SharedBySubpackages {
            roots: roots.iter().map(|r| r.to_string()).collect(),
          },
        );
      }
    };

    if let Some(bundle) = consumers
      .iter()
      .find(|name| ctx.subpackages.matching(name).is_none())
    {
      return PlacementDecision::new(
        Placement::Main,
        PlacementReason::UsedByMain {
          bundle: bundle.clone(),
        },
      );
    }

    if let Some(component) = find_outside_component(ctx, graph, module, root) {
      return PlacementDecision::new(
        Placement::Main,
        PlacementReason::ReachedFromComponent {
          component: component.to_string(),
        },
      );
    }

    PlacementDecision::new(
      Placement::Subpackage(root.to_string()),
      PlacementReason::SingleSubpackage,
    )
  }
}

pub fn placer_for(policy: PlacementPolicy) -> Box<dyn ModulePlacer> {
  match policy {
    PlacementPolicy::Strict => Box::new(StrictPlacer),
    PlacementPolicy::Compat => Box::new(CompatPlacer),
  }
}

/// Places every module of the graph using the policy selected in the build context.
#[instrument(level = "debug", skip_all, fields(modules = graph.len()))]
pub fn place_modules(ctx: &BuildContext, graph: &ModuleGraph) -> PlacementMap {
  let placer = placer_for(ctx.policy());
  let mut decisions = IndexMap::with_capacity(graph.len());

  for module in graph.modules() {
    let decision = if is_third_party_only(module) {
      PlacementDecision::new(Placement::Unsplit, PlacementReason::ThirdPartyBundle)
    } else {
      placer.place(ctx, graph, module)
    };

    debug!(
      module = module.id,
      resource = module.resource.as_deref().unwrap_or_default(),
      consumers = ?consumer_names(module),
      placement = ?decision.placement,
      reason = ?decision.reason,
      "placement: module placed"
    );

    decisions.insert(module.id.clone(), decision);
  }

  PlacementMap { decisions }
}

/// Stylesheet artifacts, page/component sources and the app entry are emitted by their
/// own paths and never split into vendor bundles.
fn is_classified(module: &Module) -> bool {
  module.kind == ModuleKind::Script
}

fn is_page_level(module: &Module) -> bool {
  matches!(module.kind, ModuleKind::Component | ModuleKind::AppEntry)
}

/// Modules held only by bundles compiled from `node_modules` keep that bundle's chunking.
fn is_third_party_only(module: &Module) -> bool {
  !module.consumers.is_empty()
    && module.consumers.iter().all(|consumer| {
      consumer
        .name
        .as_deref()
        .is_some_and(|name| !is_splittable_bundle(name))
    })
}

/// Names of the bundles consuming a module, without third party bundles.
///
/// A module held by exactly one unnamed bundle names that bundle after its own resource.
/// Other unnamed bundles get an empty name, which never matches a subpackage.
fn consumer_names(module: &Module) -> Vec<String> {
  let fallback = match module.consumers.as_slice() {
    [only] if only.name.is_none() => module.resource.clone(),
    _ => None,
  };

  module
    .consumers
    .iter()
    .map(|consumer| {
      consumer
        .name
        .clone()
        .or_else(|| fallback.clone())
        .unwrap_or_default()
    })
    .filter(|name| is_splittable_bundle(name))
    .collect()
}

/// Walks incoming sync references backwards looking for a page or component outside
/// `root`. Components inside `root` end their branch; components in independent
/// subpackages are ignored.
fn find_outside_component<'a>(
  ctx: &BuildContext,
  graph: &'a ModuleGraph,
  module: &'a Module,
  root: &str,
) -> Option<&'a str> {
  let mut visited: HashSet<&str> = HashSet::from([module.id.as_str()]);
  let mut stack: Vec<&str> = vec![module.id.as_str()];

  while let Some(id) = stack.pop() {
    for (origin, kind) in graph.incoming(id) {
      if kind == ReferenceKind::Async {
        continue;
      }

      if !visited.insert(origin.id.as_str()) {
        continue;
      }

      let Some(resource) = origin.resource.as_deref() else {
        continue;
      };

      if !is_page_level(origin) {
        stack.push(origin.id.as_str());
        continue;
      }

      if is_under(resource, root) {
        continue;
      }

      let independent = ctx
        .subpackages
        .matching(resource)
        .is_some_and(|subpackage| subpackage.independent);

      if independent {
        continue;
      }

      debug!(
        module = module.id,
        root,
        component = resource,
        "placement: reached from a component outside the subpackage"
      );
      return Some(origin.id.as_str());
    }
  }

  None
}
