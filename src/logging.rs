//! Logger setup for hosts and the demo binary.
//!
//! The library itself only uses the `log` facade; engine messages arrive under
//! the `libmpv` target.

use crate::state::LogLevel;

/// Install `env_logger`. `RUST_LOG` wins over `level`. Calling this twice is
/// harmless; the second call is ignored.
pub fn init(level: LogLevel) {
  let default_filter = level.to_filter().to_string().to_lowercase();
  let result = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
    .format_timestamp_millis()
    .try_init();
  if result.is_err() {
    log::debug!("Logger already installed");
  }
}

/// Log `message` at error level, flush, and abort the process.
pub fn fatal(target: &str, message: &str) -> ! {
  log::error!(target: target, "{}", message);
  log::logger().flush();
  std::process::abort()
}
