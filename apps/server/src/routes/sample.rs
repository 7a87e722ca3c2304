use actix_web::{HttpRequest, HttpResponse, get, web};
use serde::Deserialize;
use serde_json::json;

use crate::auth::AuthService;
use crate::error::ApiError;
use crate::routes::auth::bearer_token;

/// Greeting configuration shared by the sample routes.
pub struct Greeter {
    prefix: String,
}

impl Greeter {
    pub fn new(prefix: String) -> Self {
        Self { prefix }
    }

    fn greet(&self, name: &str) -> String {
        format!("{} {}", self.prefix, name)
    }
}

#[derive(Deserialize)]
pub struct GreetQuery {
    name: Option<String>,
}

/// Sample public endpoint.
#[get("/sample/greet")]
pub async fn greet(query: web::Query<GreetQuery>, greeter: web::Data<Greeter>) -> HttpResponse {
    let name = query.name.as_deref().unwrap_or("world");
    HttpResponse::Ok().json(json!({ "message": greeter.greet(name) }))
}

/// Sample endpoint requiring a Bearer token (unless auth.required is off).
#[get("/sample/protected")]
pub async fn protected(
    req: HttpRequest,
    auth: web::Data<AuthService>,
    greeter: web::Data<Greeter>,
) -> Result<HttpResponse, ApiError> {
    let claims = auth.identity(bearer_token(&req))?;
    Ok(HttpResponse::Ok().json(json!({ "message": greeter.greet(&claims.sub) })))
}
