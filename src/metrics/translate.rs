//! Raw value classification
//!
//! Turns a [`RawValue`] into the value its registered metric expects. The
//! metric kind comes from the descriptor, never from the value itself.

use super::{MetricDescriptor, MetricKind};
use crate::errors::TranslationError;
use crate::vehicle::RawValue;

#[derive(Debug, Clone, PartialEq)]
pub enum Translated {
    Numeric(f64),
    State { on: bool, label: &'static str },
}

pub fn translate(
    descriptor: &MetricDescriptor,
    raw: &RawValue,
) -> Result<Translated, TranslationError> {
    match descriptor.kind {
        MetricKind::Numeric => parse_number(&descriptor.resource, raw).map(Translated::Numeric),
        MetricKind::BinaryState(policy) => {
            let on = parse_state(&descriptor.resource, raw)?;
            Ok(Translated::State {
                on,
                label: policy.label(on),
            })
        }
    }
}

/// Accept exactly `"true"` or `"false"`
pub fn parse_state(resource: &str, raw: &RawValue) -> Result<bool, TranslationError> {
    match raw {
        RawValue::Text(s) if s == "true" => Ok(true),
        RawValue::Text(s) if s == "false" => Ok(false),
        other => Err(TranslationError::InvalidState {
            resource: resource.to_string(),
            value: other.to_string(),
        }),
    }
}

/// Accept JSON numbers and text that parses as a finite number
pub fn parse_number(resource: &str, raw: &RawValue) -> Result<f64, TranslationError> {
    let value = match raw {
        RawValue::Number(n) => Some(*n),
        RawValue::Text(s) => s.trim().parse::<f64>().ok(),
    };

    value
        .filter(|v| v.is_finite())
        .ok_or_else(|| TranslationError::InvalidNumber {
            resource: resource.to_string(),
            value: raw.to_string(),
        })
}
