// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use tracing_subscriber::EnvFilter;

/// Filter directives: `--debug`, else `BBR_LOG`, else `info`.
pub fn filter_directives(debug: bool, env: Option<String>) -> String {
    if debug {
        return "debug".to_string();
    }
    env.unwrap_or_else(|| "info".to_string())
}

/// Install the stderr subscriber. Stdout is left to command output.
pub fn init(debug: bool) {
    let directives = filter_directives(debug, crate::env::log_filter());
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|e| {
        eprintln!("warning: ignoring invalid BBR_LOG '{directives}': {e}");
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
