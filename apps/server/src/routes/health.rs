use actix_web::{HttpResponse, Responder, get};
use serde_json::json;

/// Health check route
/// Static payload; for most callers the response status is enough.
#[get("/health")]
pub async fn health_route() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
