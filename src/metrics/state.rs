//! Two-valued state metric
//!
//! Exposed in the prometheus_client "Enum" shape: one gauge sample per state,
//! labelled with the metric's own name, the current state at 1 and the other
//! at 0. The current state is a single atomic byte, so a scrape never sees
//! both samples at 1.

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{GaugeVec, Opts};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tracing::error;

use super::catalog::LabelPolicy;

const UNSET: u8 = 0;
const OFF: u8 = 1;
const ON: u8 = 2;

#[derive(Clone)]
pub struct BinaryStateMetric {
    inner: Arc<Inner>,
}

struct Inner {
    opts: Opts,
    policy: LabelPolicy,
    current: AtomicU8,
    // Only used for `desc`; samples are built per collect
    template: GaugeVec,
}

impl BinaryStateMetric {
    pub fn new(name: &str, help: &str, policy: LabelPolicy) -> prometheus::Result<Self> {
        let opts = Opts::new(name, help);
        let template = GaugeVec::new(opts.clone(), &[name])?;
        Ok(Self {
            inner: Arc::new(Inner {
                opts,
                policy,
                current: AtomicU8::new(UNSET),
                template,
            }),
        })
    }

    pub fn set(&self, state: bool) {
        let value = if state { ON } else { OFF };
        self.inner.current.store(value, Ordering::Relaxed);
    }

    /// Last published raw state, `None` before the first publish
    pub fn get(&self) -> Option<bool> {
        match self.inner.current.load(Ordering::Relaxed) {
            ON => Some(true),
            OFF => Some(false),
            _ => None,
        }
    }

    /// Label of the last published state
    pub fn current_label(&self) -> Option<&'static str> {
        self.get().map(|state| self.inner.policy.label(state))
    }
}

impl Collector for BinaryStateMetric {
    fn desc(&self) -> Vec<&Desc> {
        self.inner.template.desc()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let current = self.current_label();
        let label_name = self.inner.opts.name.as_str();

        let samples = match GaugeVec::new(self.inner.opts.clone(), &[label_name]) {
            Ok(samples) => samples,
            Err(e) => {
                error!("Failed to build samples for {}: {}", label_name, e);
                return Vec::new();
            }
        };

        for state in self.inner.policy.states() {
            let value = if current == Some(state) { 1.0 } else { 0.0 };
            samples.with_label_values(&[state]).set(value);
        }

        samples.collect()
    }
}
