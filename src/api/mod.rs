pub mod attendance;
pub mod employee;

use actix_web::web;

use crate::error::AppError;

/// Runs a store operation on the blocking pool; the key-value backends do
/// synchronous file I/O.
pub async fn run_blocking<F, T>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    web::block(f)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?
}
