//! Metric registry
//!
//! Maps every known resource name to its [`MetricDescriptor`] and to the live
//! metric the poll loop writes. The registry is shared behind an `Arc`: the
//! poll loop is its only writer, scrapes only read.

use prometheus::{Encoder, Gauge, Registry, TextEncoder};
use std::collections::HashMap;
use tracing::debug;

pub mod catalog;
pub mod exporter;
pub mod state;
pub mod translate;

use catalog::{policy_for, DeclaredKind, LabelPolicy, ResourceSpec, RESOURCE_CATALOG};
pub use exporter::ExporterMetrics;
pub use state::BinaryStateMetric;
pub use translate::{translate, Translated};

use crate::errors::TranslationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Numeric,
    BinaryState(LabelPolicy),
}

/// How one resource maps onto an exposed metric
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub resource: String,
    pub metric_name: String,
    pub help: String,
    pub kind: MetricKind,
}

impl From<&ResourceSpec> for MetricDescriptor {
    fn from(spec: &ResourceSpec) -> Self {
        let kind = match spec.kind {
            DeclaredKind::Numeric => MetricKind::Numeric,
            DeclaredKind::BinaryState => MetricKind::BinaryState(policy_for(spec.resource)),
        };
        Self {
            resource: spec.resource.to_string(),
            metric_name: spec.metric.to_string(),
            help: spec.help.to_string(),
            kind,
        }
    }
}

#[derive(Clone)]
pub enum MetricHandle {
    Gauge(Gauge),
    BinaryState(BinaryStateMetric),
}

pub struct MetricEntry {
    descriptor: MetricDescriptor,
    handle: MetricHandle,
}

impl MetricEntry {
    pub fn descriptor(&self) -> &MetricDescriptor {
        &self.descriptor
    }

    pub fn handle(&self) -> &MetricHandle {
        &self.handle
    }

    /// Write a translated value into the live metric
    pub fn apply(&self, value: &Translated) -> Result<(), TranslationError> {
        match (&self.handle, value) {
            (MetricHandle::Gauge(gauge), Translated::Numeric(v)) => gauge.set(*v),
            (MetricHandle::BinaryState(metric), Translated::State { on, .. }) => metric.set(*on),
            _ => {
                return Err(TranslationError::KindMismatch {
                    resource: self.descriptor.resource.clone(),
                })
            }
        }
        Ok(())
    }
}

pub struct MetricRegistry {
    registry: Registry,
    entries: HashMap<String, MetricEntry>,
    exporter: ExporterMetrics,
}

impl MetricRegistry {
    /// Build the registry for the built-in resource catalog
    pub fn new() -> prometheus::Result<Self> {
        Self::with_catalog(RESOURCE_CATALOG)
    }

    pub fn with_catalog(catalog: &[ResourceSpec]) -> prometheus::Result<Self> {
        let registry = Registry::new();
        let mut entries = HashMap::with_capacity(catalog.len());

        for spec in catalog {
            if entries.contains_key(spec.resource) {
                return Err(prometheus::Error::Msg(format!(
                    "duplicate resource in catalog: {}",
                    spec.resource
                )));
            }

            let descriptor = MetricDescriptor::from(spec);
            let handle = match descriptor.kind {
                MetricKind::Numeric => {
                    let gauge = Gauge::new(descriptor.metric_name.as_str(), descriptor.help.as_str())?;
                    registry.register(Box::new(gauge.clone()))?;
                    MetricHandle::Gauge(gauge)
                }
                MetricKind::BinaryState(policy) => {
                    let metric =
                        BinaryStateMetric::new(&descriptor.metric_name, &descriptor.help, policy)?;
                    registry.register(Box::new(metric.clone()))?;
                    MetricHandle::BinaryState(metric)
                }
            };

            debug!(
                resource = %descriptor.resource,
                metric = %descriptor.metric_name,
                kind = ?descriptor.kind,
                "Registered metric"
            );
            entries.insert(descriptor.resource.clone(), MetricEntry { descriptor, handle });
        }

        let exporter = ExporterMetrics::register(&registry)?;

        Ok(Self {
            registry,
            entries,
            exporter,
        })
    }

    pub fn lookup(&self, resource: &str) -> Option<&MetricEntry> {
        self.entries.get(resource)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &MetricDescriptor> {
        self.entries.values().map(|entry| &entry.descriptor)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn exporter(&self) -> &ExporterMetrics {
        &self.exporter
    }

    /// Current gauge value of a numeric resource
    pub fn gauge_value(&self, resource: &str) -> Option<f64> {
        match self.lookup(resource)?.handle() {
            MetricHandle::Gauge(gauge) => Some(gauge.get()),
            MetricHandle::BinaryState(_) => None,
        }
    }

    /// Current state label of a binary resource
    pub fn state_label(&self, resource: &str) -> Option<&'static str> {
        match self.lookup(resource)?.handle() {
            MetricHandle::BinaryState(metric) => metric.current_label(),
            MetricHandle::Gauge(_) => None,
        }
    }

    /// Render every registered metric in the Prometheus text format
    pub fn encode_text(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
