#![warn(clippy::all, clippy::pedantic)]

use std::net::SocketAddr;

use actix_web::{App, HttpServer, web};
use tracing::info;

mod auth;
mod error;
mod routes;

use auth::AuthService;
use error::AppError;
use routes::sample::Greeter;

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let config = settings::Config::load(None::<&std::path::Path>)?;
    logger::init_tracing(&config.log.level, &config.log.format);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    run_server(addr, &config).await
}

async fn run_server(addr: SocketAddr, config: &settings::Config) -> Result<(), AppError> {
    let auth = web::Data::new(AuthService::from_settings(&config.server));
    let greeter = web::Data::new(Greeter::new(config.server.greeter.prefix.clone()));

    info!(%addr, "API server listening");
    HttpServer::new(move || {
        App::new().app_data(auth.clone()).app_data(greeter.clone()).configure(routes::routes)
    })
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}
