use actix_web::{web, HttpResponse, Responder};
use log::{error, info};
use serde_json::json;
use tera::Context;

use crate::model;
use crate::web::models::AnalyzeRequest;
use crate::web::ApiError;
use crate::AppState;

// Index page handler
pub async fn index(data: web::Data<AppState>) -> impl Responder {
    let context = Context::new();
    match data.tera.render("index.html", &context) {
        Ok(html) => HttpResponse::Ok().content_type("text/html").body(html),
        Err(e) => {
            error!("Template error: {}", e);
            HttpResponse::InternalServerError().body("Template error")
        }
    }
}

// Health check endpoint
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

// Avatar analysis endpoint: validates the submission, issues the upstream
// call and relays the resulting SSE stream back to the browser.
pub async fn analyze(
    data: web::Data<AppState>,
    req: web::Json<AnalyzeRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = req.into_inner();

    let nickname = req.nickname.as_deref().unwrap_or("").trim();
    let image_base64 = req.image_base64.as_deref().unwrap_or("").trim();

    if nickname.is_empty() || image_base64.is_empty() {
        return Err(ApiError::Validation(
            "Missing required field: nickname or avatar image".to_string(),
        ));
    }

    info!("Analysis request for nickname: {}", nickname);

    let response = data
        .model
        .model
        .stream_analysis(nickname, image_base64)
        .await?;

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .insert_header(("Connection", "keep-alive"))
        .streaming(model::relay_stream(response)))
}
