use actix_web::web;

use crate::errors::AppError;
use crate::handlers;

pub const API_PREFIX: &str = "/angkort/api/v1";

pub fn configure(cfg: &mut web::ServiceConfig) {
    // Extractor failures answer with the same JSON error body as handlers.
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .service(
        web::resource("/api/login")
            .route(web::post().to(handlers::auth::login)),
    )
    .service(
        web::resource("/api/refresh")
            .route(web::post().to(handlers::auth::refresh)),
    )
    .service(
        web::resource("/api/logout")
            .route(web::post().to(handlers::auth::logout)),
    )
    .service(
        web::resource(format!("{}/employee", API_PREFIX))
            .route(web::get().to(handlers::employee::get_employees)),
    )
    .service(
        web::resource(format!("{}/employee/detail", API_PREFIX))
            .route(web::post().to(handlers::employee::employee_detail)),
    )
    .service(
        web::resource(format!("{}/employee/{{employee_id}}/profile", API_PREFIX))
            .route(web::get().to(handlers::employee::get_employee_profile)),
    );
}
