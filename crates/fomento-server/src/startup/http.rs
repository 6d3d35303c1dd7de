//! HTTP server setup

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, dev::Server, middleware::Logger, web};

use crate::{api, middleware::auth::Authentication, model::AppState};

/// Creates and binds the API server.
///
/// CORS is the outermost layer so browser preflights are answered before
/// authentication runs.
pub fn api_server(
    app_state: Arc<AppState>,
    address: String,
    port: u16,
) -> Result<Server, std::io::Error> {
    let cors_origins = app_state.configuration.cors_origins();

    Ok(HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);
        for origin in &cors_origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(Logger::default())
            .wrap(Authentication)
            .wrap(cors)
            .app_data(web::Data::from(app_state.clone()))
            .service(api::health::index)
            .service(api::health::routes())
            .service(api::route::routes())
    })
    .bind((address, port))?
    .run())
}
