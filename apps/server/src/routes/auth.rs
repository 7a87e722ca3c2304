use actix_web::{HttpRequest, HttpResponse, get, http::header::AUTHORIZATION, post, web};
use base64::Engine;
use serde_json::json;

use crate::auth::{AuthError, AuthService};
use crate::error::ApiError;

/// Login with HTTP Basic credentials, receive a Bearer JWT.
#[post("/auth")]
pub async fn login(
    req: HttpRequest,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, ApiError> {
    let (username, password) = basic_credentials(&req)?;
    auth.validate_credentials(&username, &password)?;
    let token = auth.create_token(&username)?;
    Ok(HttpResponse::Ok().json(token))
}

/// Verify a Bearer token.
#[post("/auth/verify")]
pub async fn verify(
    req: HttpRequest,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, ApiError> {
    let token = bearer_token(&req).ok_or(ApiError::Auth(AuthError::MissingToken))?;
    auth.verify_token(token)?;
    Ok(HttpResponse::Ok().json(json!({ "valid": true })))
}

/// Information about the current caller.
#[get("/auth/me")]
pub async fn me(req: HttpRequest, auth: web::Data<AuthService>) -> Result<HttpResponse, ApiError> {
    let claims = auth.identity(bearer_token(&req))?;
    Ok(HttpResponse::Ok().json(json!({ "username": claims.sub })))
}

/// Decode the `Authorization: Basic` header into a credential pair.
fn basic_credentials(req: &HttpRequest) -> Result<(String, String), ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::BadAuthorizationHeader)?;
    let encoded = header.strip_prefix("Basic ").ok_or(ApiError::BadAuthorizationHeader)?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| ApiError::BadAuthorizationHeader)?;
    let decoded = String::from_utf8(decoded).map_err(|_| ApiError::BadAuthorizationHeader)?;
    let (username, password) = decoded.split_once(':').ok_or(ApiError::BadAuthorizationHeader)?;
    Ok((username.to_string(), password.to_string()))
}

/// Extract the `Authorization: Bearer` token, if any.
pub(crate) fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers().get(AUTHORIZATION)?.to_str().ok()?.strip_prefix("Bearer ")
}
