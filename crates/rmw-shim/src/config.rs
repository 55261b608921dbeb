// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime configuration.
//!
//! ## Environment Variables
//! - `RMW_SHIM_INIT_LOG`: "1" or "true" logs a line when a context initializes
//! - `RMW_SHIM_LOG_LEVEL`: Logging level (default: "info")
//! - `RMW_SHIM_DISCOVERY_BATCH`: Samples taken per discovery batch (default: 8)
//! - `RMW_SHIM_DOMAIN_ID`: DDS domain ID (default: 0, or ROS_DOMAIN_ID if set)
//!
//! ## ROS 2 Compatibility
//! - `ROS_DOMAIN_ID`: Fallback for RMW_SHIM_DOMAIN_ID
//!
//! # Example
//!
//! ```bash
//! export RMW_SHIM_INIT_LOG=1
//! export RMW_SHIM_LOG_LEVEL=debug
//! export RMW_SHIM_DISCOVERY_BATCH=32
//! ```
//!
//! Topic-name mangling lives in [`NamingConfig`]; it is not read from the
//! environment.

use std::env;

/// Environment variable names
pub const ENV_INIT_LOG: &str = "RMW_SHIM_INIT_LOG";
pub const ENV_LOG_LEVEL: &str = "RMW_SHIM_LOG_LEVEL";
pub const ENV_DISCOVERY_BATCH: &str = "RMW_SHIM_DISCOVERY_BATCH";
pub const ENV_DOMAIN_ID: &str = "RMW_SHIM_DOMAIN_ID";

/// ROS 2 environment variable for domain ID (fallback)
pub const ENV_ROS_DOMAIN_ID: &str = "ROS_DOMAIN_ID";

/// Default number of samples taken per discovery batch.
pub const DEFAULT_DISCOVERY_BATCH: usize = 8;

fn flag(name: &str) -> bool {
    env::var(name)
        .ok()
        .map(|s| s == "1" || s.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Runtime configuration from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    /// Log a line when a context initializes
    pub init_log: bool,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Maximum samples taken from a discovery feed per batch (>= 1)
    pub discovery_batch: usize,

    /// DDS domain ID
    pub domain_id: u32,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            init_log: false,
            log_level: "info".to_string(),
            discovery_batch: DEFAULT_DISCOVERY_BATCH,
            domain_id: 0,
        }
    }
}

impl EnvConfig {
    /// Load configuration from environment variables
    ///
    /// Priority for domain ID:
    /// 1. RMW_SHIM_DOMAIN_ID
    /// 2. ROS_DOMAIN_ID
    /// 3. Default (0)
    #[must_use]
    pub fn from_env() -> Self {
        let domain_id = env::var(ENV_DOMAIN_ID)
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .or_else(|| {
                env::var(ENV_ROS_DOMAIN_ID)
                    .ok()
                    .and_then(|s| s.parse::<u32>().ok())
            })
            .unwrap_or(0);

        // Zero or garbage falls back to the default batch
        let discovery_batch = env::var(ENV_DISCOVERY_BATCH)
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_DISCOVERY_BATCH);

        let log_level = env::var(ENV_LOG_LEVEL)
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "info".to_string());

        Self {
            init_log: flag(ENV_INIT_LOG),
            log_level,
            discovery_batch,
            domain_id,
        }
    }

    /// Check if any custom configuration was provided
    #[must_use]
    pub fn is_custom(&self) -> bool {
        *self != Self::default()
    }

    /// Apply log level to the logging subsystem
    pub fn apply_log_level(&self) {
        if let Err(e) = env::var("RUST_LOG") {
            // Only set if RUST_LOG is not already set
            if e == env::VarError::NotPresent {
                env::set_var("RUST_LOG", &self.log_level);
            }
        }
    }
}

/// ROS topic-name mangling conventions.
///
/// Prefixes are stored without the trailing slash; a fully qualified ROS
/// name already starts with `/`, so `rq` + `/add` gives `rq/add`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingConfig {
    /// Prefix of plain topics (`rt`).
    pub topic_prefix: String,
    /// Prefix of service request topics (`rq`).
    pub request_prefix: String,
    /// Prefix of service response topics (`rr`).
    pub response_prefix: String,
    /// Suffix appended to request topic names (`Request`).
    pub request_suffix: String,
    /// Suffix appended to response topic names (`Reply`).
    pub response_suffix: String,
    /// Prefixes hidden from plain topic listings.
    pub hidden_prefixes: Vec<String>,
    /// Type-name suffix of service request types (`_Request_`).
    pub request_type_suffix: String,
    /// Type-name suffix of service response types (`_Response_`).
    pub response_type_suffix: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            topic_prefix: "rt".to_string(),
            request_prefix: "rq".to_string(),
            response_prefix: "rr".to_string(),
            request_suffix: "Request".to_string(),
            response_suffix: "Reply".to_string(),
            hidden_prefixes: ["rq", "rr", "rp", "rs", "ra"]
                .iter()
                .map(|p| (*p).to_string())
                .collect(),
            request_type_suffix: "_Request_".to_string(),
            response_type_suffix: "_Response_".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_vars<F: FnOnce()>(vars: &[(&str, Option<&str>)], f: F) {
        let saved: Vec<_> = vars
            .iter()
            .map(|(k, _)| ((*k).to_string(), env::var(k).ok()))
            .collect();
        for (k, v) in vars {
            match v {
                Some(v) => env::set_var(k, v),
                None => env::remove_var(k),
            }
        }
        f();
        for (k, v) in saved {
            match v {
                Some(v) => env::set_var(&k, v),
                None => env::remove_var(&k),
            }
        }
    }

    #[test]
    fn test_default_config() {
        let config = EnvConfig::default();
        assert_eq!(config.domain_id, 0);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.discovery_batch, DEFAULT_DISCOVERY_BATCH);
        assert!(!config.init_log);
        assert!(!config.is_custom());
    }

    // Env-mutating cases share one test so they cannot race each other.
    #[test]
    fn test_from_env() {
        with_vars(
            &[
                (ENV_DOMAIN_ID, Some("42")),
                (ENV_ROS_DOMAIN_ID, Some("99")),
                (ENV_INIT_LOG, Some("true")),
                (ENV_DISCOVERY_BATCH, Some("32")),
            ],
            || {
                let config = EnvConfig::from_env();
                assert_eq!(config.domain_id, 42);
                assert!(config.init_log);
                assert_eq!(config.discovery_batch, 32);
                assert!(config.is_custom());
            },
        );

        with_vars(
            &[
                (ENV_DOMAIN_ID, None),
                (ENV_ROS_DOMAIN_ID, Some("77")),
                (ENV_DISCOVERY_BATCH, Some("0")),
            ],
            || {
                let config = EnvConfig::from_env();
                assert_eq!(config.domain_id, 77);
                assert_eq!(config.discovery_batch, DEFAULT_DISCOVERY_BATCH);
            },
        );
    }

    #[test]
    fn test_naming_defaults() {
        let naming = NamingConfig::default();
        assert_eq!(naming.request_prefix, "rq");
        assert_eq!(naming.response_suffix, "Reply");
        assert!(naming.hidden_prefixes.iter().any(|p| p == "ra"));
        assert!(!naming.hidden_prefixes.iter().any(|p| p == "rt"));
    }
}
