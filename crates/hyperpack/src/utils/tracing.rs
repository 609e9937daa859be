use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_ENV: &str = "HYPERPACK_LOG";

static INIT: Once = Once::new();

/// Installs a stderr subscriber filtered by `HYPERPACK_LOG`, e.g. `HYPERPACK_LOG=hyperpack=debug`.
/// Does nothing when the variable is unset or another subscriber is already installed.
pub fn enable_tracing_on_demand() {
  if std::env::var_os(LOG_ENV).is_none() {
    return;
  }

  INIT.call_once(|| {
    let filter = EnvFilter::from_env(LOG_ENV);
    let _ = tracing_subscriber::registry()
      .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
      .with(filter)
      .try_init();
  });
}
