//! Identifiers for pairing runs.
//!
//! Every process gets one ULID at startup; every recommendation run gets a
//! fresh one so admins can refer back to the exact ranking they were shown.
//!
//! # Example
//! ```
//! use sp_common::run_id;
//!
//! let process = run_id::get();
//! let run = run_id::generate();
//! assert_ne!(process, run);
//! ```

use once_cell::sync::Lazy;
use ulid::Ulid;

static PROCESS_RUN_ID: Lazy<String> = Lazy::new(|| Ulid::new().to_string());

/// Process-level id, identical for the whole process lifetime.
#[inline]
pub fn get() -> &'static str {
    &PROCESS_RUN_ID
}

/// Fresh, time-ordered id (26 chars) for a single recommendation run.
#[inline]
pub fn generate() -> String {
    Ulid::new().to_string()
}
