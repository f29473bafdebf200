use crate::config::Config;
use crate::error::{Error, RemoteError};
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;

/// JSON object of remote-returned fields for a single entity.
pub type Attrs = Map<String, Value>;

/// Outcome of an admin API call that the server answered with a body.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T = Attrs> {
    Accepted(T),
    /// The body carried an `errors` payload.
    Rejected(Value),
}

impl<T> Reply<T> {
    /// Converts a rejection into `Error::RemoteOperation` tagged with `message`.
    pub fn into_result(self, message: &str) -> Result<T, Error> {
        match self {
            Reply::Accepted(value) => Ok(value),
            Reply::Rejected(errors) => Err(Error::remote_operation(message, errors)),
        }
    }
}

/// Classifies a decoded body. `errors` is checked before anything else; its
/// presence marks the call as failed whatever its content.
pub fn classify<T>(
    body: Value,
    path: &str,
    extract: impl FnOnce(Value) -> Option<T>,
) -> Result<Reply<T>, RemoteError> {
    if let Some(errors) = body.get("errors") {
        return Ok(Reply::Rejected(errors.clone()));
    }
    extract(body).map(Reply::Accepted).ok_or_else(|| RemoteError::Malformed {
        path: path.to_string(),
        reason: "unexpected body shape".into(),
    })
}

/// Pulls the entity out of its root key: `{"metric": {...}}` -> `{...}`.
pub fn unwrap_entity(body: Value, root: &str) -> Option<Attrs> {
    match body {
        Value::Object(mut map) => match map.remove(root) {
            Some(Value::Object(inner)) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}

/// Pulls a wrapped collection: `{"metrics": [{"metric": {...}}]}` -> `[{...}]`.
pub fn unwrap_collection(body: Value, root: &str, item: &str) -> Option<Vec<Attrs>> {
    let Value::Object(mut map) = body else {
        return None;
    };
    let Some(Value::Array(items)) = map.remove(root) else {
        return None;
    };
    items
        .into_iter()
        .map(|entry| unwrap_entity(entry, item))
        .collect()
}

/// Accepts the body of a DELETE: empty, or any object without `errors`.
pub fn unwrap_ack(body: Value) -> Option<()> {
    match body {
        Value::Null | Value::Object(_) => Some(()),
        _ => None,
    }
}

pub fn map_status_to_error(status: StatusCode, path: &str, body: String) -> RemoteError {
    match status {
        StatusCode::NOT_FOUND => RemoteError::NotFound {
            path: path.to_string(),
        },
        StatusCode::FORBIDDEN => RemoteError::Forbidden {
            path: path.to_string(),
        },
        status => RemoteError::UnexpectedStatus {
            status,
            path: path.to_string(),
            body,
        },
    }
}

pub fn build_client(cfg: &Config) -> reqwest::Result<Client> {
    let mut default_headers = HeaderMap::new();
    match HeaderValue::from_str(&cfg.user_agent) {
        Ok(ua) => {
            default_headers.insert(USER_AGENT, ua);
        }
        Err(_) => warn!("Ignoring invalid user agent '{}'", cfg.user_agent),
    }
    default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Client::builder()
        .default_headers(default_headers)
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .use_rustls_tls()
        .build()
}

fn metrics_path(service_id: u64) -> String {
    format!("/admin/api/services/{}/metrics.json", service_id)
}

fn metric_path(service_id: u64, metric_id: u64) -> String {
    format!("/admin/api/services/{}/metrics/{}.json", service_id, metric_id)
}

fn limits_path(plan_id: u64, metric_id: u64) -> String {
    format!(
        "/admin/api/application_plans/{}/metrics/{}/limits.json",
        plan_id, metric_id
    )
}

fn limit_path(plan_id: u64, metric_id: u64, limit_id: u64) -> String {
    format!(
        "/admin/api/application_plans/{}/metrics/{}/limits/{}.json",
        plan_id, metric_id, limit_id
    )
}

/// Typed client for the 3scale Account Management API.
///
/// Every call is a single round trip. Retrying, caching and pagination are
/// left to callers.
#[derive(Debug, Clone)]
pub struct AdminApi {
    client: Client,
    cfg: Config,
}

impl AdminApi {
    pub fn new(cfg: Config) -> Result<Self, RemoteError> {
        let client = build_client(&cfg)?;
        Ok(Self { client, cfg })
    }

    /// Sends one request and decodes the JSON body.
    ///
    /// Success and 422 bodies are returned for classification; every other
    /// status becomes a `RemoteError`. An empty body decodes to `Value::Null`.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Value, RemoteError> {
        let url = format!("{}{}", self.cfg.admin_url, path);
        debug!("{} {}", method, path);
        let mut req = self
            .client
            .request(method.clone(), &url)
            .query(&[("access_token", self.cfg.access_token.as_str())]);
        if let Some(body) = body {
            req = req.json(body);
        }
        let res = req.send().await.map_err(|e| {
            warn!("{} {} failed to send: {}", method, path, e);
            RemoteError::Transport(e)
        })?;

        let status = res.status();
        let text = res.text().await?;
        if !(status.is_success() || status == StatusCode::UNPROCESSABLE_ENTITY) {
            debug!("{} {} -> {}", method, path, status);
            return Err(map_status_to_error(status, path, text));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| RemoteError::Malformed {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    async fn send_entity<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        root: &str,
    ) -> Result<Reply, RemoteError> {
        let value = self.send(method, path, body).await?;
        classify(value, path, |v| unwrap_entity(v, root))
    }

    async fn send_delete(&self, path: &str) -> Result<Reply<()>, RemoteError> {
        let value = self.send::<()>(Method::DELETE, path, None).await?;
        classify(value, path, unwrap_ack)
    }

    async fn get_collection(
        &self,
        path: &str,
        root: &str,
        item: &str,
    ) -> Result<Reply<Vec<Attrs>>, RemoteError> {
        let value = self.send::<()>(Method::GET, path, None).await?;
        classify(value, path, |v| unwrap_collection(v, root, item))
    }

    pub async fn create_metric(&self, service_id: u64, attrs: &Attrs) -> Result<Reply, RemoteError> {
        self.send_entity(Method::POST, &metrics_path(service_id), Some(attrs), "metric")
            .await
    }

    /// Fails with `RemoteError::NotFound` when the id is unknown.
    pub async fn show_metric(&self, service_id: u64, metric_id: u64) -> Result<Reply, RemoteError> {
        self.send_entity::<()>(Method::GET, &metric_path(service_id, metric_id), None, "metric")
            .await
    }

    pub async fn update_metric(
        &self,
        service_id: u64,
        metric_id: u64,
        attrs: &Attrs,
    ) -> Result<Reply, RemoteError> {
        self.send_entity(
            Method::PUT,
            &metric_path(service_id, metric_id),
            Some(attrs),
            "metric",
        )
        .await
    }

    pub async fn delete_metric(
        &self,
        service_id: u64,
        metric_id: u64,
    ) -> Result<Reply<()>, RemoteError> {
        self.send_delete(&metric_path(service_id, metric_id)).await
    }

    pub async fn list_metrics(&self, service_id: u64) -> Result<Reply<Vec<Attrs>>, RemoteError> {
        self.get_collection(&metrics_path(service_id), "metrics", "metric")
            .await
    }

    pub async fn list_service_application_plans(
        &self,
        service_id: u64,
    ) -> Result<Reply<Vec<Attrs>>, RemoteError> {
        let path = format!("/admin/api/services/{}/application_plans.json", service_id);
        self.get_collection(&path, "plans", "application_plan").await
    }

    pub async fn list_metric_limits(
        &self,
        plan_id: u64,
        metric_id: u64,
    ) -> Result<Reply<Vec<Attrs>>, RemoteError> {
        self.get_collection(&limits_path(plan_id, metric_id), "limits", "limit")
            .await
    }

    pub async fn create_limit<B: Serialize + ?Sized>(
        &self,
        plan_id: u64,
        metric_id: u64,
        attrs: &B,
    ) -> Result<Reply, RemoteError> {
        self.send_entity(
            Method::POST,
            &limits_path(plan_id, metric_id),
            Some(attrs),
            "limit",
        )
        .await
    }

    pub async fn update_limit<B: Serialize + ?Sized>(
        &self,
        plan_id: u64,
        metric_id: u64,
        limit_id: u64,
        attrs: &B,
    ) -> Result<Reply, RemoteError> {
        self.send_entity(
            Method::PUT,
            &limit_path(plan_id, metric_id, limit_id),
            Some(attrs),
            "limit",
        )
        .await
    }

    pub async fn delete_limit(
        &self,
        plan_id: u64,
        metric_id: u64,
        limit_id: u64,
    ) -> Result<Reply<()>, RemoteError> {
        self.send_delete(&limit_path(plan_id, metric_id, limit_id))
            .await
    }
}
