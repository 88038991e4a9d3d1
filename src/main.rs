mod model;
mod web;

use actix_files as fs;
use actix_web::{
    web::{Data, JsonConfig},
    App, HttpServer,
};
use dotenv::dotenv;
use log::{error, info};
use std::env;
use tera::Tera;

use model::ModelManager;
use web::routes;

// App state structure
pub struct AppState {
    pub tera: Tera,
    pub model: Data<ModelManager>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting avatar insight web application");

    // Initialize the connection to the ERNIE vision API
    let model_manager = match ModelManager::new().await {
        Ok(manager) => {
            info!("ERNIE API client initialized");
            Data::new(manager)
        }
        Err(e) => {
            error!("Failed to initialize ERNIE API client: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize template engine
    let mut tera = match Tera::new("templates/**/*") {
        Ok(t) => t,
        Err(e) => {
            error!("Template parsing error: {}", e);
            std::process::exit(1);
        }
    };
    tera.autoescape_on(vec![".html"]);

    // Create app state
    let app_state = Data::new(AppState {
        tera,
        model: model_manager.clone(),
    });

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    info!("Listening on {}:{}", host, port);

    // Start web server
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(model_manager.clone())
            // Base64-encoded avatars can exceed the default 2 MB JSON limit
            .app_data(JsonConfig::default().limit(10 * 1024 * 1024))
            .configure(routes::configure)
            .service(fs::Files::new("/static", "./static"))
    })
    .bind((host, port))?
    .run()
    .await
}
