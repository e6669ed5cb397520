use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, TextEncoder};

const OPERATION_LABEL: &[&str] = &["operation"];

lazy_static::lazy_static!(
    pub static ref API_REQUESTS_TOTAL: CounterVec =
        counter("gestor_pix_api_requests_total", "Total number of requests sent to the PIX customer API");

    pub static ref API_REQUEST_FAILURES_TOTAL: CounterVec =
        counter("gestor_pix_api_request_failures_total", "Total number of PIX customer API requests that failed");

    pub static ref API_REQUEST_DURATION_SECONDS: HistogramVec =
        histogram("gestor_pix_api_request_duration_seconds", "Time spent waiting on the PIX customer API in seconds");
);

fn counter(name: &str, help: &str) -> CounterVec {
    let counter = CounterVec::new(Opts::new(name, help), OPERATION_LABEL)
        .unwrap_or_else(|e| panic!("invalid counter {name}: {e}"));
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .unwrap_or_else(|e| panic!("failed to register {name}: {e}"));
    counter
}

// Remote calls sit between a few milliseconds and the transport's own timeout.
fn histogram(name: &str, help: &str) -> HistogramVec {
    let opts = HistogramOpts::new(name, help)
        .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]);
    let histogram = HistogramVec::new(opts, OPERATION_LABEL)
        .unwrap_or_else(|e| panic!("invalid histogram {name}: {e}"));
    prometheus::default_registry()
        .register(Box::new(histogram.clone()))
        .unwrap_or_else(|e| panic!("failed to register {name}: {e}"));
    histogram
}

/// Renders the default registry in the Prometheus text exposition format.
pub fn render() -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&prometheus::default_registry().gather(), &mut buffer)?;

    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
