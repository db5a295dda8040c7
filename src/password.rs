use crate::error::AppResult;

/// hash_password
///
/// bcrypt-hashes a password on the blocking pool; bcrypt is deliberately slow
/// and would otherwise stall the async worker serving the request.
pub async fn hash_password(password: String, cost: u32) -> AppResult<String> {
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hashed)
}

/// verify_password
///
/// Compares a candidate password with a stored bcrypt hash. `Ok(false)` on
/// mismatch; `Err` only if the stored hash is malformed.
pub async fn verify_password(password: String, hash: String) -> AppResult<bool> {
    let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
    Ok(valid)
}
