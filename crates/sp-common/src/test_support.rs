use std::env;
use std::sync::Mutex;

static ENV_GUARD: Mutex<()> = Mutex::new(());

/// Run `f` with the given variables set (or removed), restoring them after.
/// Serialised so tests touching `SP_*` variables do not interleave.
pub(crate) fn with_envs(vars: &[(&str, Option<&str>)], f: impl FnOnce()) {
    let _guard = ENV_GUARD.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    let previous: Vec<(&str, Option<String>)> = vars
        .iter()
        .map(|(var, value)| {
            let old = env::var(var).ok();
            match value {
                Some(v) => unsafe { env::set_var(var, v) },
                None => unsafe { env::remove_var(var) },
            }
            (*var, old)
        })
        .collect();

    f();

    for (var, previous_value) in previous {
        match previous_value {
            Some(v) => unsafe { env::set_var(var, v) },
            None => unsafe { env::remove_var(var) },
        }
    }
}
