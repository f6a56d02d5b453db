/// Request path stamping for error responses
///
/// [`ApiError`](crate::error::ApiError) responses carry their
/// [`ErrorResponse`] in the response extensions with an empty `path`. This
/// layer fills in the path of the request that failed and re-renders the
/// body. Other responses pass through untouched.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::ErrorResponse;

pub async fn error_path_layer(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let mut response = next.run(req).await;

    let Some(mut body) = response.extensions_mut().remove::<ErrorResponse>() else {
        return response;
    };
    body.path = path;

    (response.status(), Json(body)).into_response()
}
