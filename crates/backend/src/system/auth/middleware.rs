use axum::{body::Body, extract::Request, http::StatusCode, middleware::Next, response::Response};

/// Middleware that requires a valid session token
pub async fn require_session(mut req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    // Extract Authorization header
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // Check Bearer prefix
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // Look up the session in the store
    let session = super::super::session::get(token).ok_or(StatusCode::UNAUTHORIZED)?;

    // Add session to request extensions for use in handlers
    req.extensions_mut().insert(session);

    Ok(next.run(req).await)
}
