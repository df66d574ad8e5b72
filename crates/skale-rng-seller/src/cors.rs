//! CORS configuration for the seller.

use actix_cors::Cors;
use actix_web::http::header::HeaderName;

/// Permissive CORS: any origin, method and header. The settlement header is
/// exposed so browser buyers can read it.
pub fn build_cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
        .expose_headers(vec![HeaderName::from_static("x-payment-response")])
        .max_age(86400)
}
