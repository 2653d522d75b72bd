use std::fmt::Display;
use std::fmt::Formatter;

use derive_builder::Builder;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use super::ErrorKind;

/// This is a user facing error.
///
/// `subjects` lists the asset, bundle or component identifiers needed to locate the
/// offending declaration.
#[derive(Builder, Clone, Debug, Default, Deserialize, Error, PartialEq, Serialize)]
#[builder(default, setter(into), build_fn(private, name = "try_build"))]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
  pub kind: ErrorKind,

  /// A summary user-facing message
  pub message: String,

  /// Indicates which stage emitted this diagnostic
  #[builder(setter(into, strip_option))]
  pub origin: Option<String>,

  pub subjects: Vec<String>,

  /// Hints for the user
  pub hints: Vec<String>,
}

impl DiagnosticBuilder {
  pub fn build(&self) -> Diagnostic {
    // Every field has a default, so building cannot fail
    self.try_build().unwrap_or_default()
  }
}

impl Diagnostic {
  pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
    Diagnostic {
      kind,
      message: message.into(),
      ..Diagnostic::default()
    }
  }

  pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
    self.origin = Some(origin.into());
    self
  }

  pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
    self.subjects.push(subject.into());
    self
  }
}

impl Display for Diagnostic {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match &self.origin {
      Some(origin) => write!(f, "[{origin}] {}", self.message),
      None => f.write_str(&self.message),
    }
  }
}
