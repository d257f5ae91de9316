//! Tracing setup shared by `sp-api` and the `smart-pairing` CLI.
//!
//! Every process logs its [`run_id`](crate::run_id) once at start-up and on
//! panics, so log lines can be tied to the recommendation runs they served.

use std::panic;
use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::run_id;

/// Per-pair ranking events live at debug in `sp_common::matching`; they are
/// on by default so an admin's "why this therapist?" can be answered from logs.
const DEFAULT_DIRECTIVES: &str = "info,sp_common::matching=debug";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// `RUST_LOG` when set and valid, otherwise [`DEFAULT_DIRECTIVES`].
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Log panics through `tracing` with the process run id attached.
/// Installed once per process.
pub fn install_tracing_panic_hook(app_name: &'static str) {
    static INSTALLED: OnceLock<()> = OnceLock::new();

    INSTALLED.get_or_init(|| {
        let default_hook = panic::take_hook();
        let include_backtrace = env_flag("SP_LOG_INCLUDE_BACKTRACE");

        panic::set_hook(Box::new(move |info| {
            let location = info
                .location()
                .map(|loc| format!("{}:{}", loc.file(), loc.line()));
            let message = info
                .payload()
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".into());

            tracing::error!(
                application = app_name,
                run_id = run_id::get(),
                thread = std::thread::current().name().unwrap_or("unnamed"),
                location = location.as_deref().unwrap_or("unknown"),
                panic_message = %message,
                "panic"
            );

            if include_backtrace {
                default_hook(info);
            }
        }));
    });
}

/// Daily-rotated `<SP_LOG_DIR>/<app>.log`, or `None` to log to stdout.
fn log_file_writer(app_name: &str) -> Option<BoxMakeWriter> {
    let dir = PathBuf::from(std::env::var_os("SP_LOG_DIR")?);
    if let Err(err) = std::fs::create_dir_all(&dir) {
        eprintln!("cannot create SP_LOG_DIR {}: {err}; logging to stdout", dir.display());
        return None;
    }

    let appender = tracing_appender::rolling::daily(dir, format!("{app_name}.log"));
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);
    // First writer wins; later calls in the same process are ignored anyway
    // because the global subscriber can only be set once.
    let _ = LOG_GUARD.set(guard);
    Some(BoxMakeWriter::new(non_blocking))
}

/// Install the global subscriber and announce the process run id.
pub fn init_tracing_subscriber(app_name: &'static str) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(true);

    let installed = match log_file_writer(app_name) {
        Some(writer) => builder.with_ansi(false).with_writer(writer).try_init(),
        None => builder.try_init(),
    };

    if installed.is_ok() {
        tracing::info!(
            application = app_name,
            run_id = run_id::get(),
            version = env!("CARGO_PKG_VERSION"),
            "logging initialised"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::with_envs;

    #[test]
    fn default_directives_enable_pairing_debug() {
        let rendered = EnvFilter::new(DEFAULT_DIRECTIVES).to_string();
        assert!(rendered.contains("sp_common::matching=debug"), "{rendered}");
    }

    #[test]
    fn invalid_rust_log_falls_back_to_defaults() {
        with_envs(&[("RUST_LOG", Some("sp_common=notalevel"))], || {
            let rendered = env_filter().to_string();
            assert!(rendered.contains("sp_common::matching=debug"), "{rendered}");
        });
    }

    #[test]
    fn file_writer_only_with_log_dir() {
        with_envs(&[("SP_LOG_DIR", None)], || {
            assert!(log_file_writer("sp-test").is_none());
        });

        let dir = std::env::temp_dir().join(format!("sp-logs-{}", run_id::generate()));
        let dir_str = dir.to_string_lossy().into_owned();
        with_envs(&[("SP_LOG_DIR", Some(dir_str.as_str()))], || {
            assert!(log_file_writer("sp-test").is_some());
        });
        assert!(dir.is_dir());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn backtrace_flag_accepts_one_and_true() {
        with_envs(&[("SP_LOG_INCLUDE_BACKTRACE", Some("TRUE"))], || {
            assert!(env_flag("SP_LOG_INCLUDE_BACKTRACE"));
        });
        with_envs(&[("SP_LOG_INCLUDE_BACKTRACE", Some("yes"))], || {
            assert!(!env_flag("SP_LOG_INCLUDE_BACKTRACE"));
        });
    }
}
