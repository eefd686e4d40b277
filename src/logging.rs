//! Logging and profiling setup.

use std::env;

use tracing_chrome::{ChromeLayerBuilder, FlushGuard};
use tracing_subscriber::{filter::LevelFilter, prelude::*, registry, EnvFilter};

const RUST_LOG_ENV: &str = "RUST_LOG";

/// Set to a file path to write a Chrome trace of every span.
const PROFILE_ENV: &str = "COD2X_PROFILE";

/// Initializes logging.
///
/// The level defaults to `INFO` and can be changed with the `RUST_LOG` environment variable, for
/// example `RUST_LOG=cod2x_anim=debug` shows stance transitions and controller movement changes.
///
/// If `COD2X_PROFILE` is set, spans are also recorded into a Chrome trace at that path. The trace
/// is flushed when the returned guard is dropped.
///
/// Does nothing if a global subscriber is already set.
pub fn init() -> Option<FlushGuard> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var(RUST_LOG_ENV)
        .from_env_lossy();

    let (chrome_layer, guard) = match env::var_os(PROFILE_ENV) {
        Some(path) => {
            let (layer, guard) = ChromeLayerBuilder::new()
                .file(path)
                .include_args(true)
                .build();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let result = registry()
        .with(tracing_subscriber::fmt::layer().with_filter(filter))
        .with(chrome_layer)
        .try_init();

    match result {
        Ok(()) => {
            info!(profiling = guard.is_some(), "initialized logging");
            guard
        }
        Err(err) => {
            debug!("logging already initialized: {err}");
            None
        }
    }
}
