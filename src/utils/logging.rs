//! Log output for the launcher.
//!
//! Two channels, each switched on or off independently:
//!
//! - **informational** (`debug`/`info`/`warn` events) written to stdout
//! - **error** (`error` events) written to stderr
//!
//! `RUST_LOG` refines verbosity inside the enabled channels and defaults to
//! `info`. Neither channel influences control flow.
//!
//! ```bash
//! RUST_LOG=bootstrapper=debug bootstrapper --log --errors --url https://example.com/meta.json --state-file meta.json
//! ```

use tracing::Level;
use tracing_subscriber::filter::{LevelFilter, filter_fn};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogChannels;

/// Install the global tracing subscriber.
///
/// Calling it again (or after another subscriber was installed, as in tests)
/// leaves the existing subscriber in place.
pub fn init(channels: LogChannels) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let info_layer = channels.info.then(|| {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(false)
            .with_filter(filter_fn(|metadata| *metadata.level() > Level::ERROR))
    });

    let error_layer = channels.errors.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(LevelFilter::ERROR)
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(info_layer)
        .with(error_layer)
        .try_init();
}
