/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`jwt`]: validation of HS256 access tokens issued by the auth service
/// - [`middleware`]: the per-request [`middleware::AuthContext`]
/// - [`authorization`]: the ownership guard run before every user mutation

pub mod authorization;
pub mod jwt;
pub mod middleware;
