use super::Service;
use crate::error::{RemoteError, Result};
use crate::http::Attrs;
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// No time window: the limit applies for all time.
    Eternity,
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
}

/// A usage ceiling of a metric within one plan.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Limit {
    pub id: u64,
    pub period: Period,
    pub value: u64,
    #[serde(default)]
    pub metric_id: Option<u64>,
    #[serde(default)]
    pub plan_id: Option<u64>,
}

impl Limit {
    pub fn is_eternity(&self) -> bool {
        self.period == Period::Eternity
    }

    /// The marker left by `Metric::disable`.
    pub fn is_zero_eternity(&self) -> bool {
        self.is_eternity() && self.value == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LimitAttrs {
    pub period: Period,
    pub value: u64,
}

impl LimitAttrs {
    pub const ZERO_ETERNITY: LimitAttrs = LimitAttrs {
        period: Period::Eternity,
        value: 0,
    };
}

fn decode_limit(attrs: Attrs, path: &str) -> Result<Limit> {
    serde_json::from_value(Value::Object(attrs)).map_err(|e| {
        RemoteError::Malformed {
            path: path.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Handle on an application plan of a service. Limits are always read from
/// and written to the remote side; nothing is cached here.
#[derive(Debug, Clone, Copy)]
pub struct ApplicationPlan<'a> {
    id: u64,
    service: &'a Service,
}

impl<'a> ApplicationPlan<'a> {
    pub fn new(id: u64, service: &'a Service) -> Self {
        Self { id, service }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub async fn metric_limits(&self, metric_id: u64) -> Result<Vec<Limit>> {
        let items = self
            .service
            .remote()
            .list_metric_limits(self.id, metric_id)
            .await?
            .into_result("Limits not read")?;
        items
            .into_iter()
            .map(|attrs| decode_limit(attrs, "limit"))
            .collect()
    }

    pub async fn create_limit(&self, metric_id: u64, attrs: &LimitAttrs) -> Result<Limit> {
        info!(
            "plan {}: creating {:?} limit {} for metric {}",
            self.id, attrs.period, attrs.value, metric_id
        );
        let created = self
            .service
            .remote()
            .create_limit(self.id, metric_id, attrs)
            .await?
            .into_result("Limit has not been created")?;
        decode_limit(created, "limit")
    }

    pub async fn update_limit(
        &self,
        metric_id: u64,
        limit_id: u64,
        attrs: &LimitAttrs,
    ) -> Result<Limit> {
        info!(
            "plan {}: updating limit {} of metric {} to {:?}/{}",
            self.id, limit_id, metric_id, attrs.period, attrs.value
        );
        let updated = self
            .service
            .remote()
            .update_limit(self.id, metric_id, limit_id, attrs)
            .await?
            .into_result("Limit has not been updated")?;
        decode_limit(updated, "limit")
    }

    pub async fn delete_limit(&self, metric_id: u64, limit_id: u64) -> Result<()> {
        info!(
            "plan {}: deleting limit {} of metric {}",
            self.id, limit_id, metric_id
        );
        self.service
            .remote()
            .delete_limit(self.id, metric_id, limit_id)
            .await?
            .into_result("Limit has not been deleted")
    }
}
