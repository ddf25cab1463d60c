//! Stderr logging for the binary.
//!
//! Library code only emits through `log`; the binary calls [`init`] once
//! with the level chosen by `-v`/`-q`. Records are bridged into a
//! `tracing-subscriber` formatter, and `JDK_INSTALLER_LOG` takes an
//! `EnvFilter` directive that overrides the flags.

use log::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a filter directive such as `jdk_installer=trace`.
pub const LOG_ENV_VAR: &str = "JDK_INSTALLER_LOG";

/// Map the CLI verbosity flags to a level filter.
///
/// Warnings are shown by default; each `-v` adds one level, and `--quiet`
/// keeps only errors.
#[must_use]
pub const fn level_for(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Filter directive that shows this crate at `level` and silences dependencies.
#[must_use]
pub fn directive_for(level: LevelFilter) -> String {
    format!("off,jdk_installer={}", level.as_str().to_ascii_lowercase())
}

fn env_filter(level: LevelFilter) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(directive_for(level)))
}

/// Install the stderr subscriber. Later calls are ignored.
pub fn init(level: LevelFilter) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .try_init();
}
