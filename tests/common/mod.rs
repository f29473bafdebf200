#![allow(dead_code)]

use httpmock::MockServer;
use serde_json::Value;
use threescale_metrics::config::Config;
use threescale_metrics::http::{AdminApi, Attrs};
use threescale_metrics::Service;

pub const TOKEN: &str = "secret";
pub const SERVICE_ID: u64 = 1;

pub fn service(server: &MockServer) -> Service {
    let cfg = Config::new(server.base_url(), TOKEN).with_timeout_secs(5);
    Service::new(SERVICE_ID, AdminApi::new(cfg).expect("client"))
}

pub fn attrs(value: Value) -> Attrs {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {}", other),
    }
}

pub fn metric_path(id: u64) -> String {
    format!("/admin/api/services/{}/metrics/{}.json", SERVICE_ID, id)
}

pub fn metrics_path() -> String {
    format!("/admin/api/services/{}/metrics.json", SERVICE_ID)
}

pub fn plans_path() -> String {
    format!("/admin/api/services/{}/application_plans.json", SERVICE_ID)
}

pub fn limits_path(plan_id: u64, metric_id: u64) -> String {
    format!(
        "/admin/api/application_plans/{}/metrics/{}/limits.json",
        plan_id, metric_id
    )
}

pub fn limit_path(plan_id: u64, metric_id: u64, limit_id: u64) -> String {
    format!(
        "/admin/api/application_plans/{}/metrics/{}/limits/{}.json",
        plan_id, metric_id, limit_id
    )
}
