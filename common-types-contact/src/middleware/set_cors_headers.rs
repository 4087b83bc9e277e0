use axum::{
    middleware::Next,
    http::{
        Request,
        header::{
            HeaderValue,
            ACCESS_CONTROL_ALLOW_ORIGIN,
            ACCESS_CONTROL_ALLOW_HEADERS,
            ACCESS_CONTROL_ALLOW_METHODS,
        }
    },
    response::Response,
    body::Body,
};

use crate::{
    Response::{ServerResponse, internal_server_error},
    Constants,
};

#[tracing::instrument(skip(req, next))]
pub async fn middleware(req: Request<Body>, next: Next<Body>) -> Result<Response, ServerResponse> {
    let origin = HeaderValue::from_str(&*Constants::ORIGIN_URL).map_err(|err| {
        tracing::error!("ORIGIN_URL is not a valid header value, {err}");
        internal_server_error("Internal Server Error")
    })?;
    let response = next.run(req).await;
    let (mut parts, body) = response.into_parts();
    parts.headers.append(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    parts.headers.append(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("POST,OPTIONS"));
    parts.headers.append(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("content-type"));
    return Ok(Response::from_parts(parts, body))
}
