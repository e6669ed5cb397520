/// Runs a block producing a `Result`, counting it as one API request for
/// `$operation` and recording its latency. `Err` results also count as failures.
///
/// The block is expanded in place, so it may `.await`.
#[macro_export]
macro_rules! measure_request {
    ($operation:expr, $code:block) => {{
        let labels = [$operation];
        $crate::metrics::API_REQUESTS_TOTAL
            .with_label_values(&labels)
            .inc();

        let start = std::time::Instant::now();
        let result = $code;
        let elapsed = start.elapsed();

        $crate::metrics::API_REQUEST_DURATION_SECONDS
            .with_label_values(&labels)
            .observe(elapsed.as_secs_f64());
        if result.is_err() {
            $crate::metrics::API_REQUEST_FAILURES_TOTAL
                .with_label_values(&labels)
                .inc();
        }
        result
    }};
}
