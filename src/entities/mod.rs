pub mod application_plan;
pub mod metric;
pub mod service;

pub use application_plan::{ApplicationPlan, Limit, LimitAttrs, Period};
pub use metric::{Metric, MetricRef};
pub use service::Service;

use crate::error::RemoteError;
use crate::http::Attrs;
use serde_json::Value;

/// Reads the numeric `id` of a remote entity.
pub(crate) fn entity_id(attrs: &Attrs, what: &str) -> Result<u64, RemoteError> {
    attrs
        .get("id")
        .and_then(Value::as_u64)
        .ok_or_else(|| RemoteError::Malformed {
            path: what.to_string(),
            reason: "missing numeric id".into(),
        })
}
