//! sqlite-vec registration
//!
//! The extension is statically linked and registered through
//! `sqlite3_auto_extension`, so it must be registered before any connection
//! is opened. Connections opened earlier never see it.

use std::ffi::c_char;
use std::sync::OnceLock;

use sqlx::SqlitePool;

static REGISTERED: OnceLock<bool> = OnceLock::new();

/// Register sqlite-vec for every connection opened from now on.
///
/// Safe to call repeatedly; registration happens once. Returns whether the
/// registration succeeded.
pub fn register_sqlite_vec() -> bool {
    *REGISTERED.get_or_init(|| {
        // SAFETY: sqlite3_vec_init is the extension's entry point; the
        // crate declares it without parameters, so it is cast to the
        // signature sqlite3_auto_extension expects.
        let result = unsafe {
            let vec_init = sqlite_vec::sqlite3_vec_init as *const ();
            let vec_init_fn: unsafe extern "C" fn(
                *mut libsqlite3_sys::sqlite3,
                *mut *mut c_char,
                *const libsqlite3_sys::sqlite3_api_routines,
            ) -> i32 = std::mem::transmute(vec_init);
            libsqlite3_sys::sqlite3_auto_extension(Some(vec_init_fn))
        };

        if result == libsqlite3_sys::SQLITE_OK {
            tracing::debug!("sqlite-vec extension registered");
            true
        } else {
            tracing::warn!(code = result, "failed to register sqlite-vec extension");
            false
        }
    })
}

/// Whether connections from `pool` answer `vec_version()`.
pub async fn is_vec_available(pool: &SqlitePool) -> bool {
    match sqlx::query_scalar::<_, String>("SELECT vec_version()")
        .fetch_optional(pool)
        .await
    {
        Ok(version) => version.is_some(),
        Err(e) => {
            tracing::debug!(error = %e, "sqlite-vec not available");
            false
        }
    }
}
