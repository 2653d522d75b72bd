use serde::Deserialize;
use serde::Serialize;

pub type ModuleId = String;

/// What the host bundler compiled a module from.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ModuleKind {
  /// Plain script code, eligible for placement
  #[default]
  Script,
  /// Page or component source; emitted as its own unit
  Component,
  /// The application entry script
  AppEntry,
  /// Stylesheet extraction artifact; emitted by a separate path
  Stylesheet,
}

/// How a module was referenced by another one.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ReferenceKind {
  #[default]
  Sync,
  /// On-demand load; a deliberate load-time boundary
  Async,
}

/// Incoming reference edge: `origin` references the module holding this edge.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleReference {
  pub origin: ModuleId,
  #[serde(default)]
  pub kind: ReferenceKind,
}

impl ModuleReference {
  pub fn sync(origin: impl Into<ModuleId>) -> Self {
    ModuleReference {
      origin: origin.into(),
      kind: ReferenceKind::Sync,
    }
  }

  pub fn asynchronous(origin: impl Into<ModuleId>) -> Self {
    ModuleReference {
      origin: origin.into(),
      kind: ReferenceKind::Async,
    }
  }
}

/// A bundle that consumes a module before placement.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerBundle {
  #[serde(default)]
  pub name: Option<String>,
}

impl ConsumerBundle {
  pub fn named(name: impl Into<String>) -> Self {
    ConsumerBundle {
      name: Some(name.into()),
    }
  }
}

/// A compiled unit, read-only to the build stages.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
  pub id: ModuleId,

  /// Source path relative to the source root, with forward slashes
  #[serde(default)]
  pub resource: Option<String>,

  #[serde(default)]
  pub kind: ModuleKind,

  #[serde(default)]
  pub references: Vec<ModuleReference>,

  #[serde(default)]
  pub consumers: Vec<ConsumerBundle>,
}

impl Module {
  pub fn new(id: impl Into<ModuleId>, kind: ModuleKind) -> Self {
    let id = id.into();
    Module {
      resource: Some(id.clone()),
      id,
      kind,
      ..Module::default()
    }
  }

  pub fn with_reference(mut self, reference: ModuleReference) -> Self {
    self.references.push(reference);
    self
  }

  pub fn with_consumer(mut self, consumer: ConsumerBundle) -> Self {
    self.consumers.push(consumer);
    self
  }
}
