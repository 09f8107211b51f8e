//! Vehicle data access
//!
//! A [`ResourceFetcher`] returns one [`RawResource`] per named value the
//! vehicle exposes. Resources are produced fresh every poll cycle and are
//! discarded once they have been translated into metrics.

use async_trait::async_trait;
use std::fmt;

use crate::auth::AccessToken;
use crate::errors::FetchResult;

pub mod catalog;
pub mod client;

pub use catalog::ResourceLink;
pub use client::VehicleDataClient;

/// Value as delivered by the API, before classification
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Number(f64),
}

impl RawValue {
    /// Convert a JSON scalar; booleans become the text tokens `"true"`/`"false"`
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            serde_json::Value::Number(n) => n.as_f64().map(Self::Number),
            serde_json::Value::Bool(b) => Some(Self::Text(b.to_string())),
            _ => None,
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{}", n),
        }
    }
}

/// A single named vehicle value from one poll cycle
#[derive(Debug, Clone, PartialEq)]
pub struct RawResource {
    pub name: String,
    pub raw_value: RawValue,
    /// False when the API had no current value for this resource
    pub valid: bool,
}

impl RawResource {
    pub fn new<N: Into<String>, V: Into<RawValue>>(name: N, raw_value: V) -> Self {
        Self {
            name: name.into(),
            raw_value: raw_value.into(),
            valid: true,
        }
    }

    pub fn invalid<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            raw_value: RawValue::Text(String::new()),
            valid: false,
        }
    }
}

/// Fetches every resource the vehicle currently exposes
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn fetch_all(&self, vehicle_id: &str, token: &AccessToken)
        -> FetchResult<Vec<RawResource>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_value_from_json() {
        assert_eq!(RawValue::from_json(&json!("55.5")), Some(RawValue::Text("55.5".into())));
        assert_eq!(RawValue::from_json(&json!(12)), Some(RawValue::Number(12.0)));
        assert_eq!(RawValue::from_json(&json!(true)), Some(RawValue::Text("true".into())));
        assert_eq!(RawValue::from_json(&json!(null)), None);
        assert_eq!(RawValue::from_json(&json!({"value": 1})), None);
    }

    #[test]
    fn test_invalid_resource() {
        let resource = RawResource::invalid("odo");
        assert!(!resource.valid);
        assert_eq!(resource.name, "odo");
    }
}
