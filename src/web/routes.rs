use crate::web::handlers;
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api").route("/analyze", web::post().to(handlers::analyze)))
        .route("/", web::get().to(handlers::index))
        .route("/health", web::get().to(handlers::health_check));
}
