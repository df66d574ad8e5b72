use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use actix_web::{test, web, App};
use alloy::primitives::{Address, FixedBytes, U256};
use serde_json::{json, Value};

use x402::codec::parse_event_stream;
use x402::{
    decode_settlement, encode_payment, ExactEvmAuthorization, ExactEvmPayload, Facilitator,
    PaymentPayload, PaymentRequiredBody, PaymentRequirements, RandomWordResponse,
    RandomnessOracle, SettleResponse, VerifyResponse, WordLength, X402Error, PAYMENT_HEADER,
    PAYMENT_RESPONSE_HEADER,
};
use x402_seller::{routes, AppState, SellerConfig, RANDOM_WORD_PATH};

const BIG_VALUE: &str = "123456789012345678901234567890123456789012345678901234567890";

#[derive(Default)]
struct Calls {
    verify: AtomicUsize,
    settle: AtomicUsize,
    oracle: AtomicUsize,
    lengths: Mutex<Vec<u8>>,
}

struct MockFacilitator {
    accept: bool,
    settle_ok: bool,
    calls: Arc<Calls>,
}

impl Facilitator for MockFacilitator {
    async fn verify(
        &self,
        payload: &PaymentPayload,
        _requirements: &PaymentRequirements,
    ) -> Result<VerifyResponse, X402Error> {
        self.calls.verify.fetch_add(1, Ordering::SeqCst);
        Ok(VerifyResponse {
            is_valid: self.accept,
            invalid_reason: (!self.accept).then(|| "insufficient_funds".to_string()),
            payer: Some(payload.payload.authorization.from),
        })
    }

    async fn settle(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> Result<SettleResponse, X402Error> {
        self.calls.settle.fetch_add(1, Ordering::SeqCst);
        if !self.settle_ok {
            return Err(X402Error::HttpError("facilitator down".to_string()));
        }
        Ok(SettleResponse {
            success: true,
            error_reason: None,
            payer: Some(payload.payload.authorization.from),
            transaction: Some("0xfeed".to_string()),
            network: requirements.network.clone(),
        })
    }
}

struct MockOracle {
    value: Option<U256>,
    calls: Arc<Calls>,
}

impl RandomnessOracle for MockOracle {
    async fn random_word(&self, word_length: WordLength) -> Result<U256, X402Error> {
        self.calls.oracle.fetch_add(1, Ordering::SeqCst);
        self.calls.lengths.lock().unwrap().push(word_length.get());
        self.value
            .ok_or_else(|| X402Error::upstream("execution reverted: rng unavailable"))
    }

    fn contract_address(&self) -> Address {
        Address::repeat_byte(0x33)
    }

    fn rpc_url(&self) -> &str {
        "http://rpc.test"
    }
}

struct Setup {
    accept: bool,
    settle_ok: bool,
    value: Option<U256>,
    extra_env: Vec<(&'static str, &'static str)>,
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            accept: true,
            settle_ok: true,
            value: Some(BIG_VALUE.parse().unwrap()),
            extra_env: vec![],
        }
    }
}

fn config(extra: &[(&str, &str)]) -> SellerConfig {
    let mut vars: HashMap<String, String> = [
        ("RECEIVING_ADDRESS", "0x1111111111111111111111111111111111111111"),
        ("TOKEN_PAYMENT_ADDRESS", "0x2222222222222222222222222222222222222222"),
        ("SKALE_RANDOM_CONTRACT_ADDRESS", "0x3333333333333333333333333333333333333333"),
        ("PAYMENT_TOKEN_NAME", "Axios USD"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }
    SellerConfig::from_lookup(move |k| vars.get(k).cloned()).unwrap()
}

fn make_state(setup: Setup) -> (web::Data<AppState<MockFacilitator, MockOracle>>, Arc<Calls>) {
    let calls = Arc::new(Calls::default());
    let facilitator = MockFacilitator {
        accept: setup.accept,
        settle_ok: setup.settle_ok,
        calls: calls.clone(),
    };
    let oracle = MockOracle {
        value: setup.value,
        calls: calls.clone(),
    };
    let state = AppState::new(config(&setup.extra_env), facilitator, oracle);
    (web::Data::new(state), calls)
}

fn proof(network: &str) -> String {
    encode_payment(&PaymentPayload {
        x402_version: 1,
        scheme: "exact".to_string(),
        network: network.to_string(),
        payload: ExactEvmPayload {
            signature: format!("0x{}", "11".repeat(65)),
            authorization: ExactEvmAuthorization {
                from: Address::repeat_byte(0x44),
                to: Address::repeat_byte(0x11),
                value: "10000".to_string(),
                valid_after: "0".to_string(),
                valid_before: "9999999999".to_string(),
                nonce: FixedBytes::repeat_byte(0x55),
            },
        },
    })
    .unwrap()
}

fn paid_request(body: Value) -> test::TestRequest {
    test::TestRequest::post()
        .uri(RANDOM_WORD_PATH)
        .insert_header((PAYMENT_HEADER, proof("eip155:324705682")))
        .set_json(body)
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state)
                .configure(routes::configure::<MockFacilitator, MockOracle>),
        )
        .await
    };
}

#[actix_rt::test]
async fn test_no_proof_returns_402_with_price_and_payee() {
    let (state, calls) = make_state(Setup::default());
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri(RANDOM_WORD_PATH)
        .set_json(json!({ "wordLength": 5 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 402);

    let body: PaymentRequiredBody = test::read_body_json(resp).await;
    assert_eq!(body.x402_version, 1);
    assert_eq!(body.error.as_deref(), Some("X-PAYMENT header is required"));
    let req = &body.accepts[0];
    assert_eq!(req.scheme, "exact");
    assert_eq!(req.network, "eip155:324705682");
    assert_eq!(req.max_amount_required, "10000");
    assert_eq!(req.pay_to, Address::repeat_byte(0x11));
    assert_eq!(req.asset, Address::repeat_byte(0x22));
    assert_eq!(req.extra.as_ref().unwrap().name, "Axios USD");

    assert_eq!(calls.verify.load(Ordering::SeqCst), 0);
    assert_eq!(calls.oracle.load(Ordering::SeqCst), 0);
}

#[actix_rt::test]
async fn test_malformed_proof_returns_402() {
    let (state, calls) = make_state(Setup::default());
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri(RANDOM_WORD_PATH)
        .insert_header((PAYMENT_HEADER, "%%%not-base64%%%"))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 402);
    let body: PaymentRequiredBody = test::read_body_json(resp).await;
    assert_eq!(body.error.as_deref(), Some("invalid payment header"));
    assert_eq!(calls.verify.load(Ordering::SeqCst), 0);
}

#[actix_rt::test]
async fn test_proof_for_other_network_returns_402() {
    let (state, calls) = make_state(Setup::default());
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri(RANDOM_WORD_PATH)
        .insert_header((PAYMENT_HEADER, proof("eip155:1")))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 402);
    assert_eq!(calls.verify.load(Ordering::SeqCst), 0);
}

#[actix_rt::test]
async fn test_valid_proof_succeeds_for_every_length() {
    let (state, calls) = make_state(Setup::default());
    let app = app!(state);

    for n in 3u8..=8 {
        let resp = test::call_service(&app, paid_request(json!({ "wordLength": n })).to_request())
            .await;
        assert_eq!(resp.status(), 200, "wordLength {n}");

        let settle = resp
            .headers()
            .get(PAYMENT_RESPONSE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(decode_settlement)
            .unwrap();
        assert!(settle.success);
        assert_eq!(settle.transaction.as_deref(), Some("0xfeed"));

        let body: RandomWordResponse = test::read_body_json(resp).await;
        assert_eq!(body.word_length, n.to_string());
        assert_eq!(body.network, "skale-base-sepolia");
        assert_eq!(
            body.contract_address.parse::<Address>().unwrap(),
            Address::repeat_byte(0x33)
        );
        assert!(body.random_value.bytes().all(|b| b.is_ascii_digit()));
    }

    assert_eq!(calls.oracle.load(Ordering::SeqCst), 6);
    assert_eq!(calls.settle.load(Ordering::SeqCst), 6);
    assert_eq!(*calls.lengths.lock().unwrap(), vec![3, 4, 5, 6, 7, 8]);
}

#[actix_rt::test]
async fn test_random_value_keeps_all_60_digits() {
    let (state, _) = make_state(Setup::default());
    let app = app!(state);

    let resp = test::call_service(&app, paid_request(json!({ "wordLength": 5 })).to_request()).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["wordLength"], "5");
    assert_eq!(body["randomValue"], BIG_VALUE);
}

#[actix_rt::test]
async fn test_string_and_default_lengths() {
    let (state, calls) = make_state(Setup::default());
    let app = app!(state);

    let resp =
        test::call_service(&app, paid_request(json!({ "wordLength": "6" })).to_request()).await;
    assert_eq!(resp.status(), 200);

    let req = test::TestRequest::post()
        .uri(RANDOM_WORD_PATH)
        .insert_header((PAYMENT_HEADER, proof("eip155:324705682")))
        .set_payload("definitely not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: RandomWordResponse = test::read_body_json(resp).await;
    assert_eq!(body.word_length, "5");

    assert_eq!(*calls.lengths.lock().unwrap(), vec![6, 5]);
}

#[actix_rt::test]
async fn test_out_of_range_is_400_and_oracle_untouched() {
    let (state, calls) = make_state(Setup::default());
    let app = app!(state);

    for bad in [json!(9), json!(2), json!(-1), json!(4.5), json!("abc")] {
        let resp =
            test::call_service(&app, paid_request(json!({ "wordLength": bad })).to_request())
                .await;
        assert_eq!(resp.status(), 400, "wordLength {bad}");
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().starts_with("wordLength must be"));
    }

    let resp = test::call_service(&app, paid_request(json!({ "wordLength": 9 })).to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "wordLength must be between 3 and 8");

    assert_eq!(calls.oracle.load(Ordering::SeqCst), 0);
    assert_eq!(calls.settle.load(Ordering::SeqCst), 0);
}

#[actix_rt::test]
async fn test_rejected_proof_is_402_and_oracle_untouched() {
    let (state, calls) = make_state(Setup {
        accept: false,
        ..Setup::default()
    });
    let app = app!(state);

    let resp = test::call_service(&app, paid_request(json!({ "wordLength": 5 })).to_request()).await;
    assert_eq!(resp.status(), 402);
    let body: PaymentRequiredBody = test::read_body_json(resp).await;
    assert_eq!(body.error.as_deref(), Some("insufficient_funds"));
    assert_eq!(body.accepts.len(), 1);

    assert_eq!(calls.verify.load(Ordering::SeqCst), 1);
    assert_eq!(calls.oracle.load(Ordering::SeqCst), 0);
    assert_eq!(calls.settle.load(Ordering::SeqCst), 0);
}

#[actix_rt::test]
async fn test_oracle_failure_is_502_and_not_settled() {
    let (state, calls) = make_state(Setup {
        value: None,
        ..Setup::default()
    });
    let app = app!(state);

    let resp = test::call_service(&app, paid_request(json!({ "wordLength": 5 })).to_request()).await;
    assert_eq!(resp.status(), 502);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Failed to fetch random value from SKALE" }));
    assert_eq!(calls.settle.load(Ordering::SeqCst), 0);
}

#[actix_rt::test]
async fn test_settlement_failure_is_402() {
    let (state, calls) = make_state(Setup {
        settle_ok: false,
        ..Setup::default()
    });
    let app = app!(state);

    let resp = test::call_service(&app, paid_request(json!({ "wordLength": 5 })).to_request()).await;
    assert_eq!(resp.status(), 402);
    let body: PaymentRequiredBody = test::read_body_json(resp).await;
    assert_eq!(body.error.as_deref(), Some("payment settlement failed"));
    assert_eq!(calls.oracle.load(Ordering::SeqCst), 1);
}

#[actix_rt::test]
async fn test_event_stream_when_requested() {
    let (state, _) = make_state(Setup::default());
    let app = app!(state);

    let req = paid_request(json!({ "wordLength": 7 }))
        .insert_header(("Accept", "text/event-stream, application/json"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "text/event-stream"
    );

    let bytes = test::read_body(resp).await;
    let text = std::str::from_utf8(&bytes).unwrap();
    assert!(text.starts_with("event: payment\n"));
    assert!(text.trim_end().ends_with("data: [DONE]"));

    let body: RandomWordResponse = parse_event_stream(text).unwrap();
    assert_eq!(body.word_length, "7");
    assert_eq!(body.random_value, BIG_VALUE);
}

#[actix_rt::test]
async fn test_json_preferred_when_listed_first() {
    let (state, _) = make_state(Setup::default());
    let app = app!(state);

    let req = paid_request(json!({ "wordLength": 4 }))
        .insert_header(("Accept", "application/json, text/event-stream"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/json"
    );
}

#[actix_rt::test]
async fn test_health_and_info() {
    let (state, _) = make_state(Setup::default());
    let app = app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "status": "healthy" }));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/info").to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["name"], "Simple SKALE RNG");
    assert_eq!(
        body["description"],
        "Paid SKALE RNG service on SKALE Base Sepolia testnet"
    );
    assert_eq!(body["endpoints"], json!(["/tools/skale-rng/random-word"]));
}

#[actix_rt::test]
async fn test_metrics_forbidden_without_token_config() {
    let (state, _) = make_state(Setup::default());
    let app = app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/metrics").to_request()).await;
    assert_eq!(resp.status(), 403);
}

#[actix_rt::test]
async fn test_metrics_requires_bearer_token() {
    let (state, _) = make_state(Setup {
        extra_env: vec![("METRICS_TOKEN", "scrape-me")],
        ..Setup::default()
    });
    let app = app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/metrics").to_request()).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::get()
        .uri("/metrics")
        .insert_header(("Authorization", "Bearer wrong"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 401);

    let req = test::TestRequest::get()
        .uri("/metrics")
        .insert_header(("Authorization", "Bearer scrape-me"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}

#[actix_rt::test]
async fn test_metrics_public_opt_in() {
    let (state, _) = make_state(Setup {
        extra_env: vec![("X402_PUBLIC_METRICS", "true")],
        ..Setup::default()
    });
    let app = app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/metrics").to_request()).await;
    assert_eq!(resp.status(), 200);
}
