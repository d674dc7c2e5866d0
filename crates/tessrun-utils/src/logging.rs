//! Tracing initialisation for the `tessrun` binary.
//!
//! Library code only emits events; installing a subscriber is the binary's
//! job. Logs go to stderr because stdout carries recognised text.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset.
#[must_use]
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "tessrun=debug,tessrun_command=debug,tessrun_runner=debug,info"
    } else {
        "tessrun=info,warn"
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence. Otherwise verbose mode enables debug events
/// from the tessrun crates. Fails if a subscriber is already installed.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter(verbose)))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_line_number(false)
                .with_file(false)
                .compact(),
        )
        .try_init()?;

    Ok(())
}
