//! Local HTTP façade over [`RandomWordClient`].
//!
//! Browsers and scripts call `POST /api/random-word` here; the façade pays the
//! seller on their behalf and relays the result or the error status.

use actix_web::http::{Method, StatusCode};
use actix_web::middleware::DefaultHeaders;
use actix_web::{web, HttpResponse};
use serde_json::{json, Value};
use x402::response::ErrorResponse;
use x402::Transport;

use crate::client::RandomWordClient;

/// Attach the fixed CORS headers to every response.
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Allow-Headers", "Content-Type, Authorization"))
        .add(("Access-Control-Allow-Methods", "GET, POST, OPTIONS"))
        .add(("Access-Control-Max-Age", "86400"))
}

/// Register the façade routes for a client over transport `T`.
pub fn configure<T: Transport + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health)).service(
        web::resource("/api/random-word")
            .route(web::post().to(random_word::<T>))
            .route(web::method(Method::OPTIONS).to(preflight)),
    );
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "healthy" }))
}

async fn preflight() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

async fn random_word<T: Transport + 'static>(
    client: web::Data<RandomWordClient<T>>,
    body: web::Bytes,
) -> HttpResponse {
    let request: Value = if body.iter().all(u8::is_ascii_whitespace) {
        json!({})
    } else {
        match serde_json::from_slice(&body) {
            Ok(v) => v,
            Err(_) => {
                return HttpResponse::BadRequest()
                    .json(ErrorResponse::new("Request body must be valid JSON"))
            }
        }
    };

    match client.random_word_from_json(request.get("wordLength")).await {
        Ok(word) => HttpResponse::Ok().json(word),
        Err(e) => {
            let status = StatusCode::from_u16(e.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            if status.is_server_error() {
                tracing::error!(status = status.as_u16(), error = %e, "random word request failed");
            } else {
                tracing::warn!(status = status.as_u16(), error = %e, "random word request rejected");
            }
            HttpResponse::build(status).json(ErrorResponse::new(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use bytes::Bytes;
    use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use x402::{OutboundRequest, TransportResponse, X402Error};

    #[derive(Clone)]
    struct StubSeller {
        status: u16,
        body: &'static str,
        calls: Arc<AtomicUsize>,
    }

    impl Transport for StubSeller {
        async fn send(&self, _request: OutboundRequest) -> Result<TransportResponse, X402Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut headers = HeaderMap::new();
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            Ok(TransportResponse {
                status: reqwest::StatusCode::from_u16(self.status).unwrap(),
                headers,
                body: Bytes::from_static(self.body.as_bytes()),
            })
        }
    }

    const WORD: &str = r#"{"network":"skale-base-sepolia","contractAddress":"0x3333333333333333333333333333333333333333","rpcUrl":"http://rpc","wordLength":"5","randomValue":"987654321"}"#;

    fn stub(status: u16, body: &'static str) -> (StubSeller, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            StubSeller {
                status,
                body,
                calls: calls.clone(),
            },
            calls,
        )
    }

    macro_rules! app {
        ($transport:expr) => {
            test::init_service(
                App::new()
                    .wrap(cors_headers())
                    .app_data(web::Data::new(RandomWordClient::new(
                        $transport,
                        "http://seller",
                    )))
                    .configure(configure::<StubSeller>),
            )
            .await
        };
    }

    #[actix_rt::test]
    async fn test_empty_body_uses_default_length() {
        let (seller, calls) = stub(200, WORD);
        let app = app!(seller);
        let req = test::TestRequest::post().uri("/api/random-word").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["wordLength"], "5");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[actix_rt::test]
    async fn test_invalid_json_is_400() {
        let (seller, calls) = stub(200, WORD);
        let app = app!(seller);
        let req = test::TestRequest::post()
            .uri("/api/random-word")
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Request body must be valid JSON");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[actix_rt::test]
    async fn test_out_of_range_is_400_without_network() {
        let (seller, calls) = stub(200, WORD);
        let app = app!(seller);
        let req = test::TestRequest::post()
            .uri("/api/random-word")
            .set_json(json!({ "wordLength": 9 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("between 3 and 8"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[actix_rt::test]
    async fn test_upstream_status_is_relayed() {
        let (seller, _) = stub(502, r#"{"error":"Failed to fetch random value from SKALE"}"#);
        let app = app!(seller);
        let req = test::TestRequest::post()
            .uri("/api/random-word")
            .set_json(json!({ "wordLength": "4" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 502);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Failed to fetch random value from SKALE");
    }

    #[actix_rt::test]
    async fn test_preflight_and_health() {
        let (seller, _) = stub(200, WORD);
        let app = app!(seller);

        let req = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/api/random-word")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 204);
        assert_eq!(
            resp.headers().get("access-control-allow-methods").unwrap(),
            "GET, POST, OPTIONS"
        );

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "healthy");
    }
}
