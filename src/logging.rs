//! Logger setup shared by the binaries.

use env_logger::Env;

/// Route `log` output to stderr, filtered by `RUST_LOG` (default `warn`).
pub fn init() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .try_init();
}
