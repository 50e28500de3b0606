use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the log subscriber.
///
/// Logs go to stderr so that stdout carries only IDs. The level comes from
/// `RUST_LOG` and defaults to `info`; `RUST_LOG=ferroflake=trace` shows the
/// generator's spans.
pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false),
        )
        .try_init()?;
    Ok(())
}
