use crate::error::Result;
use crate::http::{AdminApi, Attrs};

/// A 3scale service, the owner of metrics and application plans.
#[derive(Debug, Clone)]
pub struct Service {
    id: u64,
    remote: AdminApi,
}

impl Service {
    pub fn new(id: u64, remote: AdminApi) -> Self {
        Self { id, remote }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn remote(&self) -> &AdminApi {
        &self.remote
    }

    /// Attributes of every metric defined on the service.
    pub async fn metrics(&self) -> Result<Vec<Attrs>> {
        self.remote
            .list_metrics(self.id)
            .await?
            .into_result("Service metrics not read")
    }

    /// Attributes of every application plan attached to the service, in the
    /// order the API returns them.
    pub async fn plans(&self) -> Result<Vec<Attrs>> {
        self.remote
            .list_service_application_plans(self.id)
            .await?
            .into_result("Service plans not read")
    }
}
