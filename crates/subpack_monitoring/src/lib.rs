//! This module configures tracing output.
//!
//! Monitoring should only be initialized once.
use std::sync::Mutex;

use anyhow::anyhow;

pub use from_env::FromEnvError;
pub use tracer::TracerMode;

mod from_env;
mod tracer;

pub static MONITORING_GUARD: Mutex<Option<MonitoringGuard>> = Mutex::new(None);

pub struct MonitoringGuard {
  #[allow(unused)]
  tracer: tracer::Tracer,
}

#[derive(Debug, Default)]
pub struct MonitoringOptions {
  pub tracing_options: Vec<TracerMode>,
}

impl MonitoringOptions {
  pub fn from_env() -> Result<Self, FromEnvError> {
    Ok(Self {
      tracing_options: TracerMode::from_env()?,
    })
  }
}

pub fn initialize_monitoring(options: MonitoringOptions) -> anyhow::Result<()> {
  let mut global = MONITORING_GUARD
    .lock()
    .map_err(|_| anyhow!("Monitoring guard is poisoned"))?;

  if global.is_some() {
    tracing::warn!("Monitoring is getting set-up twice, this will no-op");
    return Ok(());
  }

  *global = Some(MonitoringGuard {
    tracer: tracer::Tracer::new(&options.tracing_options)?,
  });

  Ok(())
}

pub fn initialize_from_env() -> anyhow::Result<()> {
  initialize_monitoring(MonitoringOptions::from_env()?)
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_initialize_monitoring_multiple_times() {
    initialize_monitoring(MonitoringOptions {
      tracing_options: vec![TracerMode::Stdout],
    })
    .unwrap();

    initialize_monitoring(MonitoringOptions {
      tracing_options: vec![TracerMode::Stdout],
    })
    .unwrap();
  }
}
