// SPDX-License-Identifier: GPL-3.0-only

//! Logging setup
//!
//! `RUST_LOG` always wins over the built-in filter. The interactive terminal
//! UI owns the screen, so in that mode log lines go to a file in the cache
//! directory instead of stderr.

use crate::constants::APP_ID;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Where log output is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    /// `<cache_dir>/geosnap/geosnap.log`
    pub fn default_file() -> Self {
        let dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_ID);
        LogTarget::File(dir.join(format!("{}.log", APP_ID)))
    }
}

/// Default filter directive when `RUST_LOG` is unset
pub fn default_directive(verbose: bool) -> String {
    if verbose {
        format!("warn,{}=debug", APP_ID)
    } else {
        "warn".to_string()
    }
}

/// Install the global subscriber
///
/// Calling this more than once keeps the first subscriber.
pub fn init(verbose: bool, target: &LogTarget) -> std::io::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    match target {
        LogTarget::Stderr => {
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .try_init();
        }
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false)
                        .with_target(true)
                        .with_level(true),
                )
                .try_init();
        }
    }

    Ok(())
}
