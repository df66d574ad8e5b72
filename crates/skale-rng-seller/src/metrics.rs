use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};
use std::sync::LazyLock;

pub static REQUESTS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "skale_rng_requests_total",
        "Total HTTP requests to paid endpoints",
        &["endpoint", "status"]
    )
    .unwrap()
});

pub static PAYMENT_ATTEMPTS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "skale_rng_payment_attempts_total",
        "Total payment attempts by outcome",
        &["result"]
    )
    .unwrap()
});

pub static ORACLE_CALLS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "skale_rng_oracle_calls_total",
        "Total getRandomWord calls by outcome",
        &["result"]
    )
    .unwrap()
});

/// Count a response for `endpoint`.
pub fn record_request(endpoint: &str, status: u16) {
    REQUESTS
        .with_label_values(&[endpoint, status.to_string().as_str()])
        .inc();
}

pub fn metrics_output() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
