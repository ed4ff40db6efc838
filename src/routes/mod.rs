//! JSON API under `/api`. Handlers extract the caller, call one service
//! function and serialize its result; failures render through `ServiceError`.

use actix_multipart::form::MultipartFormConfig;
use actix_web::{HttpResponse, Responder, get, web};
use serde_json::json;

use crate::services::ServiceError;

pub mod admin;
pub mod agents;
pub mod auth;
pub mod catalog;
pub mod deliveries;
pub mod messages;
pub mod orders;

/// Upper bound for CSV catalog uploads.
const UPLOAD_LIMIT: usize = 10 * 1024 * 1024;

/// Register every API route and the extractor error handlers.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ServiceError::Form(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ServiceError::Form(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| ServiceError::Form(err.to_string()).into()),
    )
    .app_data(
        MultipartFormConfig::default()
            .total_limit(UPLOAD_LIMIT)
            .error_handler(|err, _req| ServiceError::Form(err.to_string()).into()),
    )
    .service(
        web::scope("/api")
            .service(health)
            .service(auth::register)
            .service(auth::login)
            .service(auth::me)
            .service(catalog::list_products)
            .service(catalog::upload_products)
            .service(catalog::create_product)
            .service(catalog::update_product)
            .service(catalog::list_pickup_sites)
            .service(catalog::preview_promotion)
            .service(orders::place_manual_order)
            .service(orders::place_order)
            .service(orders::list_orders)
            .service(orders::get_order)
            .service(orders::mark_processing)
            .service(orders::mark_ready)
            .service(orders::cancel_order)
            .service(orders::tracking_history)
            .service(deliveries::list_available)
            .service(deliveries::accept)
            .service(deliveries::release)
            .service(deliveries::verify_pickup)
            .service(deliveries::mark_en_route)
            .service(deliveries::record_location)
            .service(deliveries::confirm_delivery)
            .service(agents::my_profile)
            .service(agents::update_status)
            .service(agents::update_location)
            .service(messages::unread_count)
            .service(messages::inbox)
            .service(messages::send_message)
            .service(messages::mark_read)
            .service(admin::list_users)
            .service(admin::set_user_active)
            .service(admin::list_agents)
            .service(admin::decide_agent)
            .service(admin::create_pickup_site)
            .service(admin::assign_manager)
            .service(admin::list_promotions)
            .service(admin::create_promotion)
            .service(admin::set_promotion_active)
            .service(admin::list_approvals)
            .service(admin::approve)
            .service(admin::reject)
            .service(admin::regenerate_code),
    );
}

#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
