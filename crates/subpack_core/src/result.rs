use thiserror::Error;

use crate::diagnostic::Diagnostic;
use crate::diagnostic::Diagnostics;
use crate::diagnostic::ErrorKind;

pub type SubpackResult<T> = std::result::Result<T, SubpackError>;

#[derive(Error, Debug)]
pub enum SubpackError {
  #[error("{}", .0)]
  Io(#[from] std::io::Error),

  #[error("{}", .0)]
  Diagnostic(#[from] Diagnostic),

  #[error("{}", .0)]
  Diagnostics(#[from] Diagnostics),

  #[error("{}", .0)]
  Message(String),

  #[error("{}", .0)]
  Unknown(anyhow::Error),
}

impl From<anyhow::Error> for SubpackError {
  fn from(error: anyhow::Error) -> Self {
    match error.downcast::<Diagnostic>() {
      Ok(diagnostic) => SubpackError::Diagnostic(diagnostic),
      Err(error) => match error.downcast::<Diagnostics>() {
        Ok(diagnostics) => SubpackError::Diagnostics(diagnostics),
        Err(error) => SubpackError::Unknown(error),
      },
    }
  }
}

impl SubpackError {
  /// Flattens the error into the diagnostics it carries.
  pub fn into_diagnostics(self) -> Diagnostics {
    match self {
      SubpackError::Diagnostic(diagnostic) => Diagnostics::from(diagnostic),
      SubpackError::Diagnostics(diagnostics) => diagnostics,
      SubpackError::Unknown(error) => {
        Diagnostics::from(Diagnostic::new(ErrorKind::Unknown, format!("{error:#}")))
      }
      other => Diagnostics::from(Diagnostic::new(ErrorKind::Unknown, other.to_string())),
    }
  }
}
