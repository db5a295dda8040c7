//! Request handlers, one module per resource. Each handler validates its input,
//! calls the repository, and shapes the JSON response; every failure is an
//! `AppError` and leaves through its `IntoResponse`.

pub mod topics;
pub mod users;

use crate::error::AppError;

const STATUS_OK: &str = "ok";

/// Path ids arrive as raw strings so a non-numeric id is answered the same way as
/// an id that matches nothing.
fn parse_id(raw: &str, not_found: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::NotFound(not_found.to_string()))
}
