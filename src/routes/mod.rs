/// Router Module Index
///
/// Splits the route table by access level so authentication is applied once,
/// as a layer on the whole authenticated router, rather than per handler.

/// Routes open to anonymous clients.
pub mod public;

/// Routes behind the `AuthUser` middleware. Require a valid bearer token.
pub mod authenticated;
