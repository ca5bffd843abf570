//! Tracing setup

use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

const DEFAULT_LEVEL: &str = "info";

/// Install the global subscriber
///
/// `RUST_LOG` wins over the default level. Logs go to stderr so archive and
/// JSON output on stdout stay clean.
pub(crate) fn init(json_output: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_LEVEL))?;
    let registry = Registry::default().with(filter);

    if json_output {
        let subscriber = registry.with(fmt::layer().json().with_writer(std::io::stderr));
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = registry.with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        );
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(())
}
