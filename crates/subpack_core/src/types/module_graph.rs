use std::collections::HashMap;

use petgraph::graph::DiGraph;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Deserialize;
use tracing::debug;

use super::Module;
use super::ModuleId;
use super::ReferenceKind;

/// Module graph with reference edges pointing from the referencing module to the
/// referenced one. The adjacency structure is built once on construction.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(from = "Vec<Module>")]
pub struct ModuleGraph {
  graph: DiGraph<usize, ReferenceKind>,
  modules: Vec<Module>,
  node_by_id: HashMap<ModuleId, NodeIndex>,
}

impl From<Vec<Module>> for ModuleGraph {
  fn from(modules: Vec<Module>) -> Self {
    ModuleGraph::new(modules)
  }
}

impl ModuleGraph {
  pub fn new(modules: Vec<Module>) -> Self {
    let mut graph = DiGraph::with_capacity(modules.len(), modules.len());
    let mut node_by_id = HashMap::with_capacity(modules.len());

    for (idx, module) in modules.iter().enumerate() {
      let node = graph.add_node(idx);
      node_by_id.insert(module.id.clone(), node);
    }

    for module in modules.iter() {
      let target = node_by_id[&module.id];
      for reference in module.references.iter() {
        let Some(&origin) = node_by_id.get(&reference.origin) else {
          debug!(
            module = module.id,
            origin = reference.origin,
            "module graph: reference from unknown module ignored"
          );
          continue;
        };
        graph.add_edge(origin, target, reference.kind);
      }
    }

    ModuleGraph {
      graph,
      modules,
      node_by_id,
    }
  }

  pub fn modules(&self) -> impl Iterator<Item = &Module> {
    self.modules.iter()
  }

  pub fn len(&self) -> usize {
    self.modules.len()
  }

  pub fn is_empty(&self) -> bool {
    self.modules.is_empty()
  }

  pub fn get(&self, id: &str) -> Option<&Module> {
    self.node_by_id.get(id).map(|node| &self.modules[self.graph[*node]])
  }

  /// Modules that reference `id`, with the kind of each reference.
  pub fn incoming(&self, id: &str) -> Vec<(&Module, ReferenceKind)> {
    let Some(&node) = self.node_by_id.get(id) else {
      return Vec::new();
    };

    self
      .graph
      .edges_directed(node, Direction::Incoming)
      .map(|edge| (&self.modules[self.graph[edge.source()]], *edge.weight()))
      .collect()
  }
}
