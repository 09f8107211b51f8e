//! Exporter self-metrics
//!
//! Counters describing the poll loop itself, registered next to the vehicle
//! metrics so a skipped cycle is visible to the collector.

use chrono::Utc;
use prometheus::{Gauge, IntCounter, IntCounterVec, Opts, Registry};

use crate::errors::TranslationError;

pub const OUTCOME_PUBLISHED: &str = "published";
pub const OUTCOME_SKIPPED_AUTH: &str = "skipped_auth";
pub const OUTCOME_SKIPPED_FETCH: &str = "skipped_fetch";

const TRANSLATION_REASONS: &[&str] = &[
    "unknown_resource",
    "invalid_state",
    "invalid_number",
    "kind_mismatch",
];

#[derive(Clone)]
pub struct ExporterMetrics {
    pub poll_cycles: IntCounterVec,
    pub translation_errors: IntCounterVec,
    pub resources_published: IntCounter,
    pub last_success_timestamp: Gauge,
}

impl ExporterMetrics {
    pub fn register(registry: &Registry) -> prometheus::Result<Self> {
        let poll_cycles = IntCounterVec::new(
            Opts::new(
                "mercedes_exporter_poll_cycles_total",
                "Poll cycles by outcome",
            ),
            &["outcome"],
        )?;
        let translation_errors = IntCounterVec::new(
            Opts::new(
                "mercedes_exporter_translation_errors_total",
                "Resources that could not be translated into a metric",
            ),
            &["reason"],
        )?;
        let resources_published = IntCounter::new(
            "mercedes_exporter_resources_published_total",
            "Resource values written to metrics",
        )?;
        let last_success_timestamp = Gauge::new(
            "mercedes_exporter_last_success_timestamp_seconds",
            "Unix time of the last cycle that published resources",
        )?;

        registry.register(Box::new(poll_cycles.clone()))?;
        registry.register(Box::new(translation_errors.clone()))?;
        registry.register(Box::new(resources_published.clone()))?;
        registry.register(Box::new(last_success_timestamp.clone()))?;

        // Expose every label value from the first scrape on
        for outcome in [OUTCOME_PUBLISHED, OUTCOME_SKIPPED_AUTH, OUTCOME_SKIPPED_FETCH] {
            poll_cycles.with_label_values(&[outcome]);
        }
        for reason in TRANSLATION_REASONS {
            translation_errors.with_label_values(&[*reason]);
        }

        Ok(Self {
            poll_cycles,
            translation_errors,
            resources_published,
            last_success_timestamp,
        })
    }

    pub fn record_cycle(&self, outcome: &str) {
        self.poll_cycles.with_label_values(&[outcome]).inc();
    }

    pub fn record_translation_error(&self, error: &TranslationError) {
        self.translation_errors
            .with_label_values(&[error.reason()])
            .inc();
    }

    pub fn record_success(&self, published: u64) {
        self.resources_published.inc_by(published);
        self.last_success_timestamp
            .set(Utc::now().timestamp_millis() as f64 / 1000.0);
    }
}
