/// Creates an `anyhow::Error` wrapping a [`Diagnostic`](crate::diagnostic::Diagnostic).
///
/// Accepts either a format string or a `DiagnosticBuilder`.
#[macro_export]
macro_rules! diagnostic_error {
  ($fmt:literal $(, $arg:expr)* $(,)?) => {
    ::anyhow::Error::new($crate::diagnostic::Diagnostic::new(
      $crate::diagnostic::ErrorKind::Unknown,
      format!($fmt $(, $arg)*),
    ))
  };
  ($builder:expr) => {
    ::anyhow::Error::new($builder.build())
  };
}
