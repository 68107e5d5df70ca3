use actix_web::{web, HttpRequest};

use crate::error::AppError;

pub mod health;
pub mod root;

/// Register every route. Shared by `main.rs` and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(root::root))
        .configure(health::configure_routes);
}

/// Fallback for unmatched requests, rendered as Problem Details.
pub async fn not_found(req: HttpRequest) -> Result<actix_web::HttpResponse, AppError> {
    Err(AppError::not_found(format!(
        "No route for {} {}",
        req.method(),
        req.path()
    )))
}
