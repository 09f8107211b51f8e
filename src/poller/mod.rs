//! Poll-translate loop
//!
//! Every cycle obtains a valid token, fetches the vehicle's resources and
//! writes each valid one into its registered metric. Token and fetch failures
//! skip the cycle; a bad resource only skips itself. The fixed interval is the
//! retry policy.

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::auth::TokenProvider;
use crate::config::Config;
use crate::errors::TranslationError;
use crate::metrics::exporter::{OUTCOME_PUBLISHED, OUTCOME_SKIPPED_AUTH, OUTCOME_SKIPPED_FETCH};
use crate::metrics::{translate, MetricRegistry};
use crate::vehicle::{RawResource, ResourceFetcher};

#[derive(Debug, Clone)]
pub struct PollerOptions {
    pub vehicle_id: String,
    pub interval: Duration,
    /// Stop after this many cycles; `None` runs until cancelled
    pub max_cycles: Option<u64>,
}

impl PollerOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            vehicle_id: config.credentials.vehicle_id.clone(),
            interval: config.polling_interval(),
            max_cycles: None,
        }
    }
}

/// Counts for one published batch
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PublishSummary {
    pub published: u64,
    pub skipped_invalid: u64,
    pub errors: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Published(PublishSummary),
    SkippedAuth,
    SkippedFetch,
}

pub struct Poller {
    tokens: Arc<dyn TokenProvider>,
    fetcher: Arc<dyn ResourceFetcher>,
    metrics: Arc<MetricRegistry>,
    options: PollerOptions,
}

impl Poller {
    pub fn new(
        tokens: Arc<dyn TokenProvider>,
        fetcher: Arc<dyn ResourceFetcher>,
        metrics: Arc<MetricRegistry>,
        options: PollerOptions,
    ) -> Self {
        Self {
            tokens,
            fetcher,
            metrics,
            options,
        }
    }

    /// Run cycles until `shutdown` fires or `max_cycles` is reached.
    ///
    /// Cancellation is observed before each cycle and during the sleep between
    /// cycles; a cycle that has started always runs to completion. Returns the
    /// number of cycles run.
    pub async fn run(&self, shutdown: CancellationToken) -> u64 {
        info!(
            vehicle_id = %self.options.vehicle_id,
            interval_seconds = self.options.interval.as_secs_f64(),
            "Starting poll loop"
        );

        let mut cycles: u64 = 0;
        loop {
            if shutdown.is_cancelled() || self.limit_reached(cycles) {
                break;
            }

            cycles += 1;
            let outcome = self.run_cycle().await;
            debug!(cycle = cycles, ?outcome, "Poll cycle finished");

            if self.limit_reached(cycles) {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.options.interval) => {}
                _ = shutdown.cancelled() => {
                    info!("Poll loop received cancellation signal, shutting down");
                    break;
                }
            }
        }

        info!(cycles, "Poll loop stopped");
        cycles
    }

    fn limit_reached(&self, cycles: u64) -> bool {
        self.options.max_cycles.is_some_and(|max| cycles >= max)
    }

    /// One fetch-and-publish cycle
    pub async fn run_cycle(&self) -> CycleOutcome {
        let exporter = self.metrics.exporter();

        let token = match self.tokens.ensure_valid_token().await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "No valid access token, skipping poll cycle");
                exporter.record_cycle(OUTCOME_SKIPPED_AUTH);
                return CycleOutcome::SkippedAuth;
            }
        };

        let resources = match self
            .fetcher
            .fetch_all(&self.options.vehicle_id, &token)
            .await
        {
            Ok(resources) => resources,
            Err(e) => {
                warn!(error = %e, "Failed to fetch vehicle resources, skipping poll cycle");
                if e.is_unauthorized() && !self.tokens.refresh().await {
                    warn!("Token refresh after rejected request failed");
                }
                exporter.record_cycle(OUTCOME_SKIPPED_FETCH);
                return CycleOutcome::SkippedFetch;
            }
        };

        let summary = self.publish(&resources);
        exporter.record_cycle(OUTCOME_PUBLISHED);
        if summary.published > 0 {
            exporter.record_success(summary.published);
        }
        CycleOutcome::Published(summary)
    }

    /// Write every valid resource into its metric, isolating per-item failures
    pub fn publish(&self, resources: &[RawResource]) -> PublishSummary {
        let mut summary = PublishSummary::default();

        for resource in resources {
            if !resource.valid {
                trace!(resource = %resource.name, "Skipping resource without a value");
                summary.skipped_invalid += 1;
                continue;
            }

            match self.publish_one(resource) {
                Ok(()) => summary.published += 1,
                Err(e) => {
                    warn!(resource = %resource.name, error = %e, "Failed to translate resource");
                    self.metrics.exporter().record_translation_error(&e);
                    summary.errors += 1;
                }
            }
        }

        debug!(
            published = summary.published,
            skipped_invalid = summary.skipped_invalid,
            errors = summary.errors,
            "Published resources"
        );
        summary
    }

    fn publish_one(&self, resource: &RawResource) -> Result<(), TranslationError> {
        let entry = self
            .metrics
            .lookup(&resource.name)
            .ok_or_else(|| TranslationError::UnknownResource {
                resource: resource.name.clone(),
            })?;

        debug!(resource = %resource.name, value = %resource.raw_value, "Publishing resource");
        let value = translate(entry.descriptor(), &resource.raw_value)?;
        entry.apply(&value)
    }
}
