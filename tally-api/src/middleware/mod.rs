/// Middleware modules for the API server
///
/// - `error_path`: stamps the request path into error bodies

pub mod error_path;
