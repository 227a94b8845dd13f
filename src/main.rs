// src/main.rs

use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http, middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::{error, info};

use task_gateway::config::{BackendKind, Config};
use task_gateway::service::{MemoryTaskService, MongoTaskService, TaskService};
use task_gateway::{tasks, AppState};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    let task_service: Arc<dyn TaskService> = match &config.backend {
        BackendKind::Memory => {
            info!("Using in-memory task backend");
            Arc::new(MemoryTaskService::new())
        }
        BackendKind::Mongo {
            uri,
            database_name,
            collection,
        } => {
            let mongo = MongoTaskService::connect(uri, database_name, collection)
                .await
                .map_err(|e| {
                    error!("Failed to connect to MongoDB: {}", e);
                    io::Error::new(io::ErrorKind::Other, e)
                })?;
            Arc::new(mongo)
        }
    };

    let state = AppState::new(task_service, config.clone());
    let bind_addr = (config.http_host.clone(), config.http_port);

    info!(
        "Server running at http://{}:{} (request timeout {:?})",
        bind_addr.0, bind_addr.1, config.ctx_timeout
    );
    if let Some(origin) = &config.frontend_origin {
        info!("Allowed CORS Origin: {}", origin);
    }

    HttpServer::new(move || {
        let cors = match &state.config.frontend_origin {
            Some(origin) => Cors::default()
                .allowed_origin(origin)
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(vec![http::header::CONTENT_TYPE, http::header::ACCEPT])
                .max_age(3600),
            None => Cors::default(),
        };

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(state.clone()))
            .configure(tasks::configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
