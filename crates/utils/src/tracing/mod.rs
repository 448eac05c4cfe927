use surfside_core::SURFSIDE_LOG_VAR;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Re-export tracing macros for convenience
pub use ::tracing::{debug, error, info, instrument, trace, warn, Level};

/// Initialize the tracing system
///
/// `SURFSIDE_LOG` takes precedence over `default_level`. Output goes to
/// stderr so it never interleaves with command output on stdout.
pub fn init(
    default_level: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = EnvFilter::try_from_env(SURFSIDE_LOG_VAR)
        .or_else(|_| EnvFilter::try_new(default_level))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(is_tty())
        .compact()
        .with_target(true)
        .with_thread_ids(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Check if we're running in a TTY environment
fn is_tty() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stderr())
}
