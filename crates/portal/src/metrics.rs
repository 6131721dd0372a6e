use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref API_REQUESTS_TOTAL: IntCounterVec = {
        let counter = IntCounterVec::new(
            Opts::new(
                "job_portal_api_requests_total",
                "Total number of job API requests by operation and outcome.",
            ),
            &["operation", "outcome"],
        )
        .expect("valid metric definition");
        REGISTRY
            .register(Box::new(counter.clone()))
            .expect("Failed to register API_REQUESTS_TOTAL");
        counter
    };
}

pub fn record_request(operation: &str, success: bool) {
    let outcome = if success { "success" } else { "error" };
    API_REQUESTS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
}

// Text exposition of everything in REGISTRY.
pub fn gather_metrics() -> crate::Result<String> {
    lazy_static::initialize(&API_REQUESTS_TOTAL);

    let mut buffer = vec![];
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
