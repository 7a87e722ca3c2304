pub mod auth;
pub mod health;
pub mod sample;

use actix_web::web;

/// Mount all API routes under `/api/v1`.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(health::health_route)
            .service(auth::login)
            .service(auth::verify)
            .service(auth::me)
            .service(sample::greet)
            .service(sample::protected),
    );
}
