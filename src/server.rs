use std::path::Path;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{
    dev::Server, http::header, middleware, web, App, HttpServer,
};
use tracing::{info, warn};

use crate::{
    configuration::{AppState, State},
    controller::{events, subscribe, vapid_public_key, version},
    error::Error,
};

const JSON_LIMIT: usize = 4096;

pub fn init_server(app_state: AppState<State>) -> Result<Server, Error> {
    let host = app_state.config.server_host.to_owned();
    let port = app_state.config.port;

    let static_dir = match &app_state.config.static_dir {
        Some(dir) if Path::new(dir).is_dir() => Some(dir.to_owned()),
        Some(dir) => {
            warn!("Static directory {} not found, serving API only", dir);
            None
        },
        None => None,
    };

    let server = HttpServer::new(move || {
        let app = app_state.clone();
        let allowed_cors = String::from("*");
        let cors_access_all =
            app.config.allowed_origins.contains(&allowed_cors);
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _| {
                if cors_access_all {
                    return true;
                }
                let allowed = &app.config.allowed_origins;
                if let Ok(origin) = origin.to_str() {
                    return allowed.contains(&origin.to_owned());
                }
                false
            })
            .allowed_methods(vec!["GET", "POST", "DELETE"])
            .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT])
            .allowed_header(header::CONTENT_TYPE);

        let mut app = App::new()
            .wrap(cors)
            .wrap(middleware::Compress::default())
            .app_data(web::Data::new(app_state.clone()))
            .configure(api);

        if let Some(dir) = &static_dir {
            app = app.service(Files::new("/", dir).index_file("index.html"));
        }

        app
    })
    .bind((host.to_owned(), port))?
    .disable_signals()
    .run();

    info!("Listening on {}:{}", host, port);

    Ok(server)
}

/// REST routes under `/api`. Extractor failures are answered with the same
/// JSON error body as handler errors.
pub fn api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(
                web::JsonConfig::default().limit(JSON_LIMIT).error_handler(
                    |err, _| Error::InvalidInput(err.to_string()).into(),
                ),
            )
            .app_data(web::QueryConfig::default().error_handler(|err, _| {
                Error::InvalidInput(err.to_string()).into()
            }))
            .service(events::get_index)
            .service(events::post_index)
            .service(events::delete_index)
            .service(subscribe::post_index)
            .service(vapid_public_key::index)
            .service(version::index),
    );
}
