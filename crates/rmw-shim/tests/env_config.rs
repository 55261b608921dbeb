// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Environment configuration applied by context initialization.
//!
//! Kept in its own test binary: it rewrites process-wide environment
//! variables, and every case runs inside the single test below.

use anyhow::Result;
use rmw_shim::config::{ENV_LOG_LEVEL, ENV_ROS_DOMAIN_ID};
use rmw_shim::{Context, InitOptions};
use std::env;

#[test]
fn context_init_exports_configured_log_level() -> Result<()> {
    env::remove_var("RUST_LOG");
    env::set_var(ENV_LOG_LEVEL, "debug");

    let options = InitOptions::new();
    assert_eq!(options.config.log_level, "debug");
    assert!(options.config.is_custom());
    let _context = Context::init(&options)?;
    assert_eq!(env::var("RUST_LOG").ok().as_deref(), Some("debug"));

    // An explicit RUST_LOG is left alone.
    env::set_var("RUST_LOG", "warn");
    env::set_var(ENV_LOG_LEVEL, "trace");
    env::set_var(ENV_ROS_DOMAIN_ID, "12");
    let options = InitOptions::new();
    assert_eq!(options.config.domain_id, 12);
    let _context = Context::init(&options)?;
    assert_eq!(env::var("RUST_LOG").ok().as_deref(), Some("warn"));

    // Unset level falls back to the default and is still exported.
    env::remove_var("RUST_LOG");
    env::remove_var(ENV_LOG_LEVEL);
    let _context = Context::init(&InitOptions::new())?;
    assert_eq!(env::var("RUST_LOG").ok().as_deref(), Some("info"));

    env::remove_var("RUST_LOG");
    env::remove_var(ENV_ROS_DOMAIN_ID);
    Ok(())
}
