//! Reconcile the index as posts are saved.
//!
//! A notify watcher feeds changed content paths into a single processor task,
//! so reconciliation runs never overlap.

pub mod error;
pub mod runtime;

pub use error::WatchError;
pub use runtime::{run, start_blocking, DEBOUNCE_WINDOW};

/// Install the stderr log subscriber. `RUST_LOG` overrides `default_filter`.
///
/// Library crates log through the `log` facade; the subscriber's log bridge
/// picks those records up as well.
pub fn init_tracing(default_filter: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
