//! Database dispatch macros for reducing code duplication.
//!
//! The sqlx pools are distinct types per backend, so every operation on a
//! [`DbPool`](super::pool::DbPool) is a three-armed match. The macro below
//! writes those arms.

/// Macro for generating database dispatch match arms.
///
/// This macro generates match arms for `DbPool` variants, reducing the need
/// to manually write repetitive match statements.
///
/// # Example
///
/// ```ignore
/// let rows = impl_db_dispatch!(pool, {
///     MySql(p) => sqlx::query(sql).execute(p).await?.rows_affected(),
///     Postgres(p) => sqlx::query(sql).execute(p).await?.rows_affected(),
///     SQLite(p) => sqlx::query(sql).execute(p).await?.rows_affected(),
/// });
/// ```
#[macro_export]
macro_rules! impl_db_dispatch {
    ($pool:expr, { $($variant:ident($p:ident) => $body:expr),+ $(,)? }) => {
        match $pool {
            $(
                $crate::db::pool::DbPool::$variant($p) => $body,
            )+
        }
    };
}

pub use impl_db_dispatch;
