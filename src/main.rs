use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use log::{error, info};

use employee_profile_backend::config::Config;
use employee_profile_backend::routes;
use employee_profile_backend::state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(|err| {
        error!("{}", err);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string())
    })?;

    let state = AppState::from_config(&config).await.map_err(|err| {
        error!("{}", err);
        std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
    })?;
    let state = web::Data::new(state);

    info!("Starting server at {}", config.bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
