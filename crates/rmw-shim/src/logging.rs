// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Logging initialization.
//!
//! The crate only emits through the `log` facade. These helpers install
//! `env_logger` for hosts that do not bring their own logger; a second
//! initialization fails with [`Error::InvalidArgument`] and leaves the
//! first logger in place.

use crate::error::{Error, Result};
use std::str::FromStr;

/// Log level for shim logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            other => Err(Error::invalid_argument(format!("unknown log level '{other}'"))),
        }
    }
}

fn already_initialized(_: log::SetLoggerError) -> Error {
    Error::invalid_argument("logger already initialized")
}

/// Initialize console logging at `level`.
pub fn init(level: LogLevel) -> Result<()> {
    env_logger::Builder::new()
        .filter_level(level.into())
        .format_timestamp_millis()
        .try_init()
        .map_err(already_initialized)
}

/// Initialize logging from `RUST_LOG`, falling back to `default_level`.
pub fn init_env(default_level: LogLevel) -> Result<()> {
    let filter: log::LevelFilter = default_level.into();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter.to_string()))
        .format_timestamp_millis()
        .try_init()
        .map_err(already_initialized)
}

/// Initialize logging with a filter string (e.g. `"rmw_shim=debug,info"`).
pub fn init_with_filter(filter: &str) -> Result<()> {
    if filter.trim().is_empty() {
        return Err(Error::invalid_argument("empty log filter"));
    }
    env_logger::Builder::new()
        .parse_filters(filter)
        .format_timestamp_millis()
        .try_init()
        .map_err(already_initialized)
}
