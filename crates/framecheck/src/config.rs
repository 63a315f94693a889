//! Process-wide checking configuration.
//!
//! Three independent flags, each an atomic with no compound invariant across
//! fields. The host application may flip them at any time; wrapped functions
//! read them fresh on every invocation, so changes take effect on the next
//! call. A call in flight while a flag changes may observe a mix of old and
//! new values; that race is tolerated and documented, not locked away.
//!
//! The log sink for demoted type errors is the global `tracing` dispatcher;
//! install a subscriber to route the single error event per failing call.

use std::sync::atomic::{AtomicBool, Ordering};

/// Checking configuration, shared by reference with every wrapped function.
#[derive(Debug)]
pub struct TypeCheckConfig {
    enable_type_checks: AtomicBool,
    strict_type_checks: AtomicBool,
    log_type_errors: AtomicBool,
}

impl TypeCheckConfig {
    /// Defaults: checks enabled, non-strict comparison, raise on error.
    pub const fn new() -> Self {
        Self {
            enable_type_checks: AtomicBool::new(true),
            strict_type_checks: AtomicBool::new(false),
            log_type_errors: AtomicBool::new(false),
        }
    }

    /// Global kill switch for the check/report phases.
    pub fn enable_type_checks(&self) -> bool {
        self.enable_type_checks.load(Ordering::Relaxed)
    }

    pub fn set_enable_type_checks(&self, enabled: bool) {
        self.enable_type_checks.store(enabled, Ordering::Relaxed);
    }

    /// Default strict-mode flag, overridable per wrapper.
    pub fn strict_type_checks(&self) -> bool {
        self.strict_type_checks.load(Ordering::Relaxed)
    }

    pub fn set_strict_type_checks(&self, strict: bool) {
        self.strict_type_checks.store(strict, Ordering::Relaxed);
    }

    /// Report type errors through `tracing` instead of failing the call.
    pub fn log_type_errors(&self) -> bool {
        self.log_type_errors.load(Ordering::Relaxed)
    }

    pub fn set_log_type_errors(&self, log: bool) {
        self.log_type_errors.store(log, Ordering::Relaxed);
    }
}

impl Default for TypeCheckConfig {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_CONFIG: TypeCheckConfig = TypeCheckConfig::new();

/// The process-wide configuration used by wrappers without a local one.
pub fn config() -> &'static TypeCheckConfig {
    &GLOBAL_CONFIG
}
