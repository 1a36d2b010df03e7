//! Prometheus metrics & middleware helper.

use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Global Prometheus handle reused in tests.
pub static METRICS: Lazy<PrometheusMetrics> = Lazy::new(|| {
    PrometheusMetricsBuilder::new("teams")
        .endpoint("/metrics") // exposed URL
        .build()
        .expect("metrics builder")
});

struct Domain {
    registry: Registry,
    registrations: IntCounter,
    events: IntCounterVec,
}

static DOMAIN: Lazy<Domain> = Lazy::new(|| {
    let registry = Registry::new_custom(Some("teams".into()), None).expect("domain registry");
    let registrations = IntCounter::new(
        "hackathon_registrations_total",
        "Hackathon teams registered",
    )
    .expect("registrations counter");
    let events = IntCounterVec::new(
        Opts::new("events_handled_total", "Bus events dispatched to handlers"),
        &["event"],
    )
    .expect("events counter");

    registry
        .register(Box::new(registrations.clone()))
        .expect("register registrations");
    registry
        .register(Box::new(events.clone()))
        .expect("register events");

    Domain {
        registry,
        registrations,
        events,
    }
});

pub fn record_registration() {
    DOMAIN.registrations.inc();
}

pub fn record_event(name: &str) {
    DOMAIN.events.with_label_values(&[name]).inc();
}

/// Domain counters in the text exposition format.
pub fn encode_domain() -> Result<Vec<u8>, prometheus::Error> {
    let mut buf = Vec::new();
    TextEncoder::new().encode(&DOMAIN.registry.gather(), &mut buf)?;
    Ok(buf)
}
