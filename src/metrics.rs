//! Prometheus metrics for the engine and its HTTP surface.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry, TextEncoder,
};

pub struct Metrics {
    registry: Registry,
    pub candle_cache_hits_total: IntCounter,
    pub candle_cache_misses_total: IntCounter,
    pub provider_fetches_total: IntCounter,
    pub provider_fetch_failures_total: IntCounter,
    pub provider_fetch_duration_seconds: Histogram,
    pub movers_requests_total: IntCounter,
    pub http_requests_total: IntCounter,
    pub http_requests_in_flight: IntGauge,
    pub http_request_duration_seconds: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let candle_cache_hits_total = IntCounter::with_opts(Opts::new(
            "candle_cache_hits_total",
            "Candle series served from the cache",
        ))?;
        let candle_cache_misses_total = IntCounter::with_opts(Opts::new(
            "candle_cache_misses_total",
            "Candle lookups that required a provider fetch",
        ))?;
        let provider_fetches_total = IntCounter::with_opts(Opts::new(
            "provider_fetches_total",
            "Candle fetches dispatched to the provider",
        ))?;
        let provider_fetch_failures_total = IntCounter::with_opts(Opts::new(
            "provider_fetch_failures_total",
            "Candle fetches that failed or timed out",
        ))?;
        let provider_fetch_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "provider_fetch_duration_seconds",
                "Latency of provider candle fetches",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        )?;
        let movers_requests_total = IntCounter::with_opts(Opts::new(
            "movers_requests_total",
            "Top-movers queries served",
        ))?;
        let http_requests_total = IntCounter::with_opts(Opts::new(
            "http_requests_total",
            "HTTP requests handled",
        ))?;
        let http_requests_in_flight = IntGauge::with_opts(Opts::new(
            "http_requests_in_flight",
            "HTTP requests currently being served",
        ))?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency",
        ))?;

        registry.register(Box::new(candle_cache_hits_total.clone()))?;
        registry.register(Box::new(candle_cache_misses_total.clone()))?;
        registry.register(Box::new(provider_fetches_total.clone()))?;
        registry.register(Box::new(provider_fetch_failures_total.clone()))?;
        registry.register(Box::new(provider_fetch_duration_seconds.clone()))?;
        registry.register(Box::new(movers_requests_total.clone()))?;
        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            candle_cache_hits_total,
            candle_cache_misses_total,
            provider_fetches_total,
            provider_fetch_failures_total,
            provider_fetch_duration_seconds,
            movers_requests_total,
            http_requests_total,
            http_requests_in_flight,
            http_request_duration_seconds,
        })
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
