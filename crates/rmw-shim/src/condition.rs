// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Guard conditions signalled by the shim.
//!
//! The shim only sets and clears trigger values. Blocking until a condition
//! fires belongs to the wait-set layer above; [`GuardCondition::wait`] is a
//! minimal helper for that layer and for tests.

use crate::error::{check_identifier, Result};
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Manually-triggered condition stamped with the implementation that owns it.
pub struct GuardCondition {
    id: u64,
    implementation_identifier: String,
    trigger_value: Mutex<bool>,
    cond: Condvar,
    /// Number of times the value was set to `true`.
    triggers: AtomicU64,
}

impl GuardCondition {
    /// Create a guard condition owned by this implementation (trigger = false).
    pub fn new() -> Self {
        Self::with_identifier(crate::IMPLEMENTATION_IDENTIFIER)
    }

    /// Create a guard condition stamped with an explicit implementation id.
    pub fn with_identifier(identifier: &str) -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);

        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            implementation_identifier: identifier.to_string(),
            trigger_value: Mutex::new(false),
            cond: Condvar::new(),
            triggers: AtomicU64::new(0),
        }
    }

    pub fn implementation_identifier(&self) -> &str {
        &self.implementation_identifier
    }

    /// Set the trigger value; `true` wakes every waiter.
    pub fn set_trigger_value(&self, value: bool) {
        let mut current = self.trigger_value.lock();
        *current = value;
        if value {
            self.triggers.fetch_add(1, Ordering::Relaxed);
            self.cond.notify_all();
        }
    }

    pub fn get_trigger_value(&self) -> bool {
        *self.trigger_value.lock()
    }

    /// Total number of `true` triggers since creation.
    pub fn trigger_count(&self) -> u64 {
        self.triggers.load(Ordering::Relaxed)
    }

    /// Block until the trigger value is `true` or the timeout elapses.
    ///
    /// Returns the trigger value observed on exit. The value is left as is;
    /// consumers re-check actual state rather than counting wake-ups. A
    /// timeout too large to express as a deadline waits without limit.
    pub fn wait(&self, timeout: Duration) -> bool {
        let mut value = self.trigger_value.lock();
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            while !*value {
                self.cond.wait(&mut value);
            }
            return true;
        };
        while !*value {
            if self.cond.wait_until(&mut value, deadline).timed_out() {
                break;
            }
        }
        *value
    }
}

impl Default for GuardCondition {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GuardCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardCondition")
            .field("id", &self.id)
            .field("implementation_identifier", &self.implementation_identifier)
            .field("trigger_value", &self.get_trigger_value())
            .finish()
    }
}

/// Trigger `guard` on behalf of `identifier`.
///
/// Fails with an identity mismatch when either the caller or the guard
/// belongs to another middleware implementation.
pub fn trigger_guard_condition(identifier: &str, guard: &GuardCondition) -> Result<()> {
    check_identifier(identifier)?;
    check_identifier(guard.implementation_identifier())?;
    guard.set_trigger_value(true);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn trigger_sets_value_and_counts() {
        let guard = GuardCondition::new();
        assert!(!guard.get_trigger_value());

        trigger_guard_condition(crate::IMPLEMENTATION_IDENTIFIER, &guard).expect("trigger");
        assert!(guard.get_trigger_value());
        assert_eq!(guard.trigger_count(), 1);

        guard.set_trigger_value(false);
        assert!(!guard.get_trigger_value());
        assert_eq!(guard.trigger_count(), 1);
    }

    #[test]
    fn trigger_rejects_foreign_guard() {
        let guard = GuardCondition::with_identifier("rmw_foreign");
        let err = trigger_guard_condition(crate::IMPLEMENTATION_IDENTIFIER, &guard).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IdentityMismatch);
        assert!(!guard.get_trigger_value());
    }

    #[test]
    fn wait_times_out_when_untriggered() {
        let guard = GuardCondition::new();
        assert!(!guard.wait(Duration::from_millis(10)));
    }

    #[test]
    fn wait_wakes_on_trigger_from_other_thread() {
        let guard = Arc::new(GuardCondition::new());
        let signaller = Arc::clone(&guard);

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            signaller.set_trigger_value(true);
        });

        assert!(guard.wait(Duration::from_secs(5)));
        handle.join().expect("join");
    }

    #[test]
    fn debug_shows_distinct_ids() {
        let a = format!("{:?}", GuardCondition::new());
        let b = format!("{:?}", GuardCondition::new());
        assert!(a.contains("id: "));
        assert_ne!(a, b);
    }

    #[test]
    fn unbounded_wait_returns_when_already_triggered() {
        let guard = GuardCondition::new();
        guard.set_trigger_value(true);
        assert!(guard.wait(Duration::MAX));
    }

    #[test]
    fn unbounded_wait_wakes_on_trigger_from_other_thread() {
        let guard = Arc::new(GuardCondition::new());
        let signaller = Arc::clone(&guard);

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            signaller.set_trigger_value(true);
        });

        assert!(guard.wait(Duration::MAX));
        handle.join().expect("join");
    }
}
