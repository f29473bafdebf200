use assert_cmd::Command;
use httpmock::{
    Method::{DELETE, GET, POST, PUT},
    MockServer,
};
use predicates::prelude::*;
use serde_json::json;

fn stdout_json(assert: assert_cmd::assert::Assert) -> serde_json::Value {
    let out = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    serde_json::from_str(&out).unwrap()
}

fn mock_metric_5(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(GET).path("/admin/api/services/1/metrics/5.json");
        then.status(200)
            .json_body(json!({"metric": {"id": 5, "system_name": "hits", "friendly_name": "Hits"}}));
    })
}

fn cmd(server: &MockServer) -> anyhow::Result<Command> {
    let mut cmd = Command::cargo_bin("threescale-metrics")?;
    cmd.env("THREESCALE_ADMIN_URL", server.base_url())
        .env("THREESCALE_ACCESS_TOKEN", "t")
        .env_remove("RUST_LOG")
        .arg("--log-level")
        .arg("warn");
    Ok(cmd)
}

#[test]
fn version_flag_prints_version() -> anyhow::Result<()> {
    Command::cargo_bin("threescale-metrics")?
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("threescale-metrics "));
    Ok(())
}

#[test]
fn missing_token_is_reported() -> anyhow::Result<()> {
    Command::cargo_bin("threescale-metrics")?
        .env("THREESCALE_ADMIN_URL", "http://127.0.0.1:9")
        .env_remove("THREESCALE_ACCESS_TOKEN")
        .args(["--service", "1", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("THREESCALE_ACCESS_TOKEN"));
    Ok(())
}

#[test]
fn show_by_system_name() -> anyhow::Result<()> {
    let server = MockServer::start();
    let _m = server.mock(|when, then| {
        when.method(GET)
            .path("/admin/api/services/1/metrics.json")
            .query_param("access_token", "t");
        then.status(200).json_body(json!({"metrics": [
            {"metric": {"id": 8, "system_name": "hits", "friendly_name": "Hits"}}
        ]}));
    });

    cmd(&server)?
        .args(["--service", "1", "show", "hits"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"friendly_name\": \"Hits\""));
    Ok(())
}

#[test]
fn show_missing_metric_fails() -> anyhow::Result<()> {
    let server = MockServer::start();
    let _m = server.mock(|when, then| {
        when.method(GET).path("/admin/api/services/1/metrics.json");
        then.status(200).json_body(json!({"metrics": []}));
    });

    cmd(&server)?
        .args(["--service", "1", "show", "uploads"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Metric 'uploads' not found"));
    Ok(())
}

#[test]
fn create_sends_attributes() -> anyhow::Result<()> {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(POST)
            .path("/admin/api/services/1/metrics.json")
            .json_body(json!({"system_name": "hits", "friendly_name": "Hits", "unit": "hit"}));
        then.status(201).json_body(json!({
            "metric": {"id": 5, "system_name": "hits", "friendly_name": "Hits", "unit": "hit"}
        }));
    });

    cmd(&server)?
        .args([
            "--service",
            "1",
            "create",
            "--system-name",
            "hits",
            "--friendly-name",
            "Hits",
            "--unit",
            "hit",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\": 5"));
    m.assert();
    Ok(())
}

#[test]
fn disable_by_id_zeroes_plan_limits() -> anyhow::Result<()> {
    let server = MockServer::start();
    let _show = server.mock(|when, then| {
        when.method(GET).path("/admin/api/services/1/metrics/5.json");
        then.status(200)
            .json_body(json!({"metric": {"id": 5, "system_name": "hits"}}));
    });
    let _plans = server.mock(|when, then| {
        when.method(GET)
            .path("/admin/api/services/1/application_plans.json");
        then.status(200)
            .json_body(json!({"plans": [{"application_plan": {"id": 12}}]}));
    });
    let _limits = server.mock(|when, then| {
        when.method(GET)
            .path("/admin/api/application_plans/12/metrics/5/limits.json");
        then.status(200).json_body(json!({"limits": [
            {"limit": {"id": 7, "period": "eternity", "value": 10}}
        ]}));
    });
    let update = server.mock(|when, then| {
        when.method(PUT)
            .path("/admin/api/application_plans/12/metrics/5/limits/7.json")
            .json_body(json!({"period": "eternity", "value": 0}));
        then.status(200)
            .json_body(json!({"limit": {"id": 7, "period": "eternity", "value": 0}}));
    });

    cmd(&server)?
        .args(["--service", "1", "disable", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"enabled\": false"));
    update.assert();
    Ok(())
}

#[test]
fn create_requires_friendly_name() -> anyhow::Result<()> {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(POST).path("/admin/api/services/1/metrics.json");
        then.status(201).json_body(json!({"metric": {"id": 5}}));
    });

    cmd(&server)?
        .args(["--service", "1", "create", "--system-name", "hits"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--friendly-name"));
    assert_eq!(m.hits(), 0);
    Ok(())
}

#[test]
fn update_prints_new_attributes() -> anyhow::Result<()> {
    let server = MockServer::start();
    let _show = mock_metric_5(&server);
    let update = server.mock(|when, then| {
        when.method(PUT)
            .path("/admin/api/services/1/metrics/5.json")
            .json_body(json!({"friendly_name": "Requests", "unit": "request"}));
        then.status(200).json_body(json!({
            "metric": {"id": 5, "system_name": "hits", "friendly_name": "Requests", "unit": "request"}
        }));
    });

    let assert = cmd(&server)?
        .args([
            "--service",
            "1",
            "update",
            "5",
            "--friendly-name",
            "Requests",
            "--unit",
            "request",
        ])
        .assert()
        .success();
    let out = stdout_json(assert);
    assert_eq!(out["friendly_name"], "Requests");
    assert_eq!(out["unit"], "request");
    update.assert();
    Ok(())
}

#[test]
fn delete_prints_deleted_id() -> anyhow::Result<()> {
    let server = MockServer::start();
    let _show = mock_metric_5(&server);
    let delete = server.mock(|when, then| {
        when.method(DELETE).path("/admin/api/services/1/metrics/5.json");
        then.status(200).body("");
    });

    let assert = cmd(&server)?
        .args(["--service", "1", "delete", "5"])
        .assert()
        .success();
    assert_eq!(stdout_json(assert), json!({"deleted": 5}));
    delete.assert();
    Ok(())
}

#[test]
fn delete_rejection_fails_command() -> anyhow::Result<()> {
    let server = MockServer::start();
    let _show = mock_metric_5(&server);
    let _delete = server.mock(|when, then| {
        when.method(DELETE).path("/admin/api/services/1/metrics/5.json");
        then.status(422)
            .json_body(json!({"errors": {"base": ["metric is in use"]}}));
    });

    cmd(&server)?
        .args(["--service", "1", "delete", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Metric has not been deleted"));
    Ok(())
}

#[test]
fn enable_removes_zero_eternity_limit() -> anyhow::Result<()> {
    let server = MockServer::start();
    let _show = mock_metric_5(&server);
    let _plans = server.mock(|when, then| {
        when.method(GET)
            .path("/admin/api/services/1/application_plans.json");
        then.status(200)
            .json_body(json!({"plans": [{"application_plan": {"id": 12}}]}));
    });
    let _limits = server.mock(|when, then| {
        when.method(GET)
            .path("/admin/api/application_plans/12/metrics/5/limits.json");
        then.status(200).json_body(json!({"limits": [
            {"limit": {"id": 7, "period": "eternity", "value": 0}}
        ]}));
    });
    let delete = server.mock(|when, then| {
        when.method(DELETE)
            .path("/admin/api/application_plans/12/metrics/5/limits/7.json");
        then.status(200).body("");
    });

    let assert = cmd(&server)?
        .args(["--service", "1", "enable", "5"])
        .assert()
        .success();
    assert_eq!(stdout_json(assert), json!({"metric": 5, "enabled": true}));
    delete.assert();
    Ok(())
}

#[test]
fn status_lists_each_plan() -> anyhow::Result<()> {
    let server = MockServer::start();
    let _show = mock_metric_5(&server);
    let _plans = server.mock(|when, then| {
        when.method(GET)
            .path("/admin/api/services/1/application_plans.json");
        then.status(200).json_body(json!({"plans": [
            {"application_plan": {"id": 11}},
            {"application_plan": {"id": 12}}
        ]}));
    });
    let _p1 = server.mock(|when, then| {
        when.method(GET)
            .path("/admin/api/application_plans/11/metrics/5/limits.json");
        then.status(200).json_body(json!({"limits": [
            {"limit": {"id": 40, "period": "eternity", "value": 0}}
        ]}));
    });
    let _p2 = server.mock(|when, then| {
        when.method(GET)
            .path("/admin/api/application_plans/12/metrics/5/limits.json");
        then.status(200).json_body(json!({"limits": [
            {"limit": {"id": 7, "period": "eternity", "value": 10}}
        ]}));
    });

    let assert = cmd(&server)?
        .args(["--service", "1", "status", "5"])
        .assert()
        .success();
    assert_eq!(
        stdout_json(assert),
        json!({"metric": 5, "plans": [
            {"plan": 11, "enabled": false},
            {"plan": 12, "enabled": true}
        ]})
    );
    Ok(())
}
