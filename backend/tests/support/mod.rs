use std::env;
use std::sync::{Mutex, PoisonError};

/// Environment variables are process-global; every test that touches them
/// goes through this lock.
static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Run `f` with `changes` applied to the environment, then put every touched
/// variable back, even if `f` panics. `None` unsets a variable.
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let _restore = EnvRestore::apply(changes);
    f()
}

struct EnvRestore {
    previous: Vec<(String, Option<String>)>,
}

impl EnvRestore {
    fn apply(changes: &[(&str, Option<&str>)]) -> Self {
        let mut previous: Vec<(String, Option<String>)> = Vec::new();
        for (key, value) in changes {
            if !previous.iter().any(|(k, _)| k == key) {
                previous.push((key.to_string(), env::var(key).ok()));
            }
            set_or_remove(key, *value);
        }
        Self { previous }
    }
}

impl Drop for EnvRestore {
    fn drop(&mut self) {
        for (key, value) in self.previous.iter().rev() {
            set_or_remove(key, value.as_deref());
        }
    }
}

fn set_or_remove(key: &str, value: Option<&str>) {
    match value {
        Some(v) => env::set_var(key, v),
        None => env::remove_var(key),
    }
}
