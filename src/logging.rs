//! Tracing subscriber setup for the CLI.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Crates whose level `--verbose` raises to debug.
pub const WORKSPACE_CRATES: &[&str] = &[
    "sui_subscriptions",
    "sui_subscriptions_transport",
    "sui_subscriptions_types",
];

/// Build the filter: `--verbose` forces debug for the workspace crates,
/// otherwise `RUST_LOG` applies, falling back to info for the workspace and
/// warn for everything else.
pub fn build_filter(verbose: bool) -> EnvFilter {
    if verbose {
        let directives: Vec<String> = WORKSPACE_CRATES
            .iter()
            .map(|name| format!("{}=debug", name))
            .collect();
        return EnvFilter::new(format!("{},info", directives.join(",")));
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives: Vec<String> = WORKSPACE_CRATES
            .iter()
            .map(|name| format!("{}=info", name))
            .collect();
        EnvFilter::new(format!("{},warn", directives.join(",")))
    })
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean
/// for command output. Calling this twice is a no-op.
pub fn init_logging(verbose: bool) {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(build_filter(verbose))
        .try_init();
}
