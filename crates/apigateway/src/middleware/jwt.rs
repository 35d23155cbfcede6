use axum::{
    Extension,
    body::Body,
    http::{Method, Request, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use shared::{abstract_trait::DynJwtService, errors::HttpError};
use tracing::debug;

/// Requires a valid demo token on mutating requests. Reads
/// `Authorization: Bearer <token>` first, then the `token` cookie.
pub async fn auth_middleware(
    cookie_jar: CookieJar,
    Extension(jwt): Extension<DynJwtService>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HttpError> {
    if matches!(*req.method(), Method::GET | Method::HEAD | Method::OPTIONS) {
        return Ok(next.run(req).await);
    }

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|auth_header| auth_header.to_str().ok())
        .and_then(|auth_value| auth_value.strip_prefix("Bearer "))
        .map(str::to_owned)
        .or_else(|| cookie_jar.get("token").map(|cookie| cookie.value().to_string()));

    let Some(token) = token else {
        return Err(HttpError::Unauthorized(
            "You are not logged in, please provide token".to_string(),
        ));
    };

    let claims = jwt.verify_token(&token).map_err(|e| {
        debug!("Rejected token: {e}");
        HttpError::Unauthorized("Invalid token".to_string())
    })?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
