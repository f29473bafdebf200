use super::{entity_id, ApplicationPlan, Limit, LimitAttrs, Service};
use crate::error::Result;
use crate::http::Attrs;
use log::{debug, info};
use serde_json::Value;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// How a caller names a metric: by remote id or by system name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricRef {
    Id(u64),
    SystemName(String),
}

impl FromStr for MetricRef {
    type Err = Infallible;

    /// All-digit input is an id; anything else is a system name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<u64>() {
            Ok(id) => MetricRef::Id(id),
            Err(_) => MetricRef::SystemName(s.to_string()),
        })
    }
}

impl From<u64> for MetricRef {
    fn from(id: u64) -> Self {
        MetricRef::Id(id)
    }
}

impl From<&str> for MetricRef {
    fn from(name: &str) -> Self {
        MetricRef::SystemName(name.to_string())
    }
}

impl fmt::Display for MetricRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricRef::Id(id) => write!(f, "{}", id),
            MetricRef::SystemName(name) => f.write_str(name),
        }
    }
}

/// A metric of a service, as seen from the admin API.
///
/// Attributes are fetched on first access unless supplied at construction,
/// and replaced wholesale by a successful `update`.
#[derive(Debug, Clone)]
pub struct Metric<'a> {
    id: u64,
    service: &'a Service,
    attrs: Option<Attrs>,
}

impl<'a> Metric<'a> {
    pub fn new(id: u64, service: &'a Service, attrs: Option<Attrs>) -> Self {
        Self { id, service, attrs }
    }

    pub async fn create(service: &'a Service, attrs: &Attrs) -> Result<Self> {
        let created = service
            .remote()
            .create_metric(service.id(), attrs)
            .await?
            .into_result("Metric has not been created")?;
        let id = entity_id(&created, "metric")?;
        info!("service {}: created metric {}", service.id(), id);
        Ok(Self::new(id, service, Some(created)))
    }

    /// Looks a metric up by id first, then by system name.
    ///
    /// An id the API does not know is retried as a system name (its decimal
    /// text), so numeric-looking system names still resolve.
    pub async fn find(service: &'a Service, reference: &MetricRef) -> Result<Option<Self>> {
        match reference {
            MetricRef::Id(id) => {
                let mut metric = Self::new(*id, service, None);
                let lookup = metric.attrs().await.map(|_| ());
                match lookup {
                    Ok(()) => Ok(Some(metric)),
                    Err(e) if e.is_not_found() => {
                        debug!("metric id {} not found; scanning system names", id);
                        Self::find_by_system_name(service, &id.to_string()).await
                    }
                    Err(e) => Err(e),
                }
            }
            MetricRef::SystemName(name) => Self::find_by_system_name(service, name).await,
        }
    }

    pub async fn find_by_system_name(service: &'a Service, system_name: &str) -> Result<Option<Self>> {
        let found = service
            .metrics()
            .await?
            .into_iter()
            .find(|m| m.get("system_name").and_then(Value::as_str) == Some(system_name));
        match found {
            Some(attrs) => {
                let id = entity_id(&attrs, "metric")?;
                Ok(Some(Self::new(id, service, Some(attrs))))
            }
            None => Ok(None),
        }
    }

    pub async fn list(service: &'a Service) -> Result<Vec<Self>> {
        service
            .metrics()
            .await?
            .into_iter()
            .map(|attrs| -> Result<Self> {
                let id = entity_id(&attrs, "metric")?;
                Ok(Self::new(id, service, Some(attrs)))
            })
            .collect()
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub async fn attrs(&mut self) -> Result<&Attrs> {
        let attrs = match self.attrs.take() {
            Some(attrs) => attrs,
            None => self.fetch_attrs().await?,
        };
        Ok(self.attrs.insert(attrs))
    }

    /// Sends `new_attrs` to the API. Cached attributes are only replaced when
    /// the API accepts the change.
    pub async fn update(&mut self, new_attrs: &Attrs) -> Result<&Attrs> {
        let updated = self
            .service
            .remote()
            .update_metric(self.service.id(), self.id, new_attrs)
            .await?
            .into_result("Metric has not been updated")?;
        Ok(self.attrs.insert(updated))
    }

    pub async fn delete(self) -> Result<()> {
        self.service
            .remote()
            .delete_metric(self.service.id(), self.id)
            .await?
            .into_result("Metric has not been deleted")?;
        info!("service {}: deleted metric {}", self.service.id(), self.id);
        Ok(())
    }

    /// Blocks all usage of the metric in every plan of the service by setting
    /// a zero-valued eternity limit.
    ///
    /// Plans are processed one at a time; an error stops the loop and leaves
    /// the plans already visited disabled. Running it again converges.
    pub async fn disable(&self) -> Result<()> {
        for plan in self.service_plans().await? {
            match self.plan_eternity_limit(&plan).await? {
                None => {
                    plan.create_limit(self.id, &LimitAttrs::ZERO_ETERNITY).await?;
                }
                Some(limit) if limit.value != 0 => {
                    plan.update_limit(self.id, limit.id, &LimitAttrs::ZERO_ETERNITY)
                        .await?;
                }
                Some(_) => debug!("plan {}: metric {} already disabled", plan.id(), self.id),
            }
        }
        Ok(())
    }

    /// Removes the zero-valued eternity limit from every plan of the service.
    /// Eternity limits with a non-zero value are left alone.
    pub async fn enable(&self) -> Result<()> {
        for plan in self.service_plans().await? {
            match self.plan_zero_eternity_limit(&plan).await? {
                Some(limit) => plan.delete_limit(self.id, limit.id).await?,
                None => debug!("plan {}: metric {} already enabled", plan.id(), self.id),
            }
        }
        Ok(())
    }

    /// Whether `plan` carries the zero-valued eternity limit for this metric.
    pub async fn is_disabled_in(&self, plan: &ApplicationPlan<'_>) -> Result<bool> {
        Ok(self.plan_zero_eternity_limit(plan).await?.is_some())
    }

    /// Every plan of the owning service, in API order.
    pub async fn service_plans(&self) -> Result<Vec<ApplicationPlan<'a>>> {
        let service = self.service;
        service
            .plans()
            .await?
            .into_iter()
            .map(|attrs| -> Result<ApplicationPlan<'a>> {
                Ok(ApplicationPlan::new(entity_id(&attrs, "application_plan")?, service))
            })
            .collect()
    }

    async fn fetch_attrs(&self) -> Result<Attrs> {
        self.service
            .remote()
            .show_metric(self.service.id(), self.id)
            .await?
            .into_result("Metric attrs not read")
    }

    // At most one eternity limit exists per (plan, metric).
    async fn plan_eternity_limit(&self, plan: &ApplicationPlan<'_>) -> Result<Option<Limit>> {
        Ok(plan
            .metric_limits(self.id)
            .await?
            .into_iter()
            .find(Limit::is_eternity))
    }

    async fn plan_zero_eternity_limit(&self, plan: &ApplicationPlan<'_>) -> Result<Option<Limit>> {
        Ok(plan
            .metric_limits(self.id)
            .await?
            .into_iter()
            .find(Limit::is_zero_eternity))
    }
}
