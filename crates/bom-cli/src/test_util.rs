//! Helpers for tests that touch process-wide state.

use std::sync::{Mutex, MutexGuard};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Serialize tests that read or mutate environment variables.
pub fn lock_env() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Snapshot of a set of environment variables, cleared on creation and
/// restored on drop. Hold [`lock_env`] for the lifetime of this value.
pub struct ScopedEnv {
    saved: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    pub fn new(vars: &[&str]) -> Self {
        let saved = vars
            .iter()
            .map(|v| (v.to_string(), std::env::var(v).ok()))
            .collect();
        for v in vars {
            unsafe { std::env::remove_var(v) };
        }
        Self { saved }
    }

    pub fn set(&mut self, var: &str, value: &str) {
        if !self.saved.iter().any(|(name, _)| name == var) {
            self.saved.push((var.to_string(), std::env::var(var).ok()));
        }
        unsafe { std::env::set_var(var, value) };
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (var, value) in &self.saved {
            match value {
                Some(v) => unsafe { std::env::set_var(var, v) },
                None => unsafe { std::env::remove_var(var) },
            }
        }
    }
}
