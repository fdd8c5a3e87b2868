// Route exports
pub mod cafes;

use actix_web::{error, web, HttpRequest, HttpResponse};
use crate::models::ErrorResponse;

pub use cafes::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(cafes::configure),
    );
}

/// Turn query-string extraction failures into the usual JSON error body
pub fn handle_query_payload_error(err: error::QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("Query payload error on {}: {}", req.path(), err);
    let response = HttpResponse::BadRequest().json(ErrorResponse::new(format!("Invalid query: {}", err)));
    error::InternalError::from_response(err, response).into()
}
