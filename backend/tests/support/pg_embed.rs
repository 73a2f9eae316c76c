//! Embedded PostgreSQL bootstrap for the Diesel adapter tests.
//!
//! Every test binary shares one cluster for the life of the process and gets
//! a fresh temporary database per test. Set `SKIP_TEST_CLUSTER=1` to skip
//! these suites where the cluster cannot start.

use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};

/// Ensures `PG_PASSWORD` is stable so a reused data directory keeps
/// accepting the password it was initialised with.
fn ensure_stable_password() {
    if std::env::var_os("PG_PASSWORD").is_none() {
        // SAFETY: runs before the cluster bootstrap spawns any threads.
        unsafe {
            std::env::set_var("PG_PASSWORD", "polls_embedded_test");
        }
    }
}

/// Shared cluster handle, bootstrapped on first use.
pub fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    ensure_stable_password();
    pg_embedded_setup_unpriv::test_support::shared_cluster_handle().map_err(|err| err.to_string())
}

/// A fresh, empty database on the shared cluster, dropped with the handle.
pub fn temporary_database() -> Result<TemporaryDatabase, String> {
    shared_cluster()?
        .temporary_database(format!("polls_test_{}", uuid::Uuid::new_v4().simple()))
        .map_err(|err| err.to_string())
}

/// Returns true when `SKIP_TEST_CLUSTER` is set to "1", "true" or "yes".
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skips with a marker when `SKIP_TEST_CLUSTER` is truthy, otherwise panics
/// so CI breakage is not masked.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// Flatten a `postgres` error into its code, message and detail.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };
    let mut summary = format!(
        "postgres error {:?}: {}",
        db_error.code(),
        db_error.message()
    );
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}
