use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

static ENV_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Exclusive access to the `JUDGELOOP_*` / `OPENROUTER_*` variables for one
/// test. Every variable touched through the scope is restored on drop, in
/// reverse order, before the lock is released.
pub(super) struct EnvScope {
    saved: Vec<(&'static str, Option<String>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvScope {
    pub(super) fn lock() -> Self {
        Self {
            saved: Vec::new(),
            _lock: ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    pub(super) fn set(&mut self, key: &'static str, value: &str) -> &mut Self {
        self.saved.push((key, std::env::var(key).ok()));
        // SAFETY: env mutation in tests only happens while ENV_LOCK is held.
        unsafe { std::env::set_var(key, value) };
        self
    }

    pub(super) fn unset(&mut self, key: &'static str) -> &mut Self {
        self.saved.push((key, std::env::var(key).ok()));
        // SAFETY: see `set`.
        unsafe { std::env::remove_var(key) };
        self
    }

    /// Clear every variable `apply_env_overrides` reads.
    pub(super) fn clean(&mut self) -> &mut Self {
        for key in [
            "JUDGELOOP_API_KEY",
            "OPENROUTER_API_KEY",
            "JUDGELOOP_BASE_URL",
            "JUDGELOOP_JUDGE_MODEL",
            "JUDGELOOP_COMBINER_MODEL",
            "JUDGELOOP_GENERATOR_MODEL",
        ] {
            self.unset(key);
        }
        self
    }
}

impl Drop for EnvScope {
    fn drop(&mut self) {
        while let Some((key, previous)) = self.saved.pop() {
            // SAFETY: `_lock` is dropped after this body runs.
            unsafe {
                match previous {
                    Some(value) => std::env::set_var(key, value),
                    None => std::env::remove_var(key),
                }
            }
        }
    }
}
