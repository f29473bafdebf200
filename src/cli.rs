use anyhow::{anyhow, Context};
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::{json, Value};
use threescale_metrics::http::{AdminApi, Attrs};
use threescale_metrics::{Metric, MetricRef, Service};

fn metric_ref_arg() -> Arg {
    Arg::new("metric")
        .required(true)
        .value_name("REF")
        .help("Metric id or system name")
}

fn attr_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("friendly-name")
            .long("friendly-name")
            .num_args(1)
            .help("Human readable name"),
    )
    .arg(Arg::new("unit").long("unit").num_args(1).help("Measurement unit, e.g. hit"))
    .arg(
        Arg::new("description")
            .long("description")
            .num_args(1)
            .help("Free-form description"),
    )
}

pub fn build_cli() -> Command {
    Command::new("threescale-metrics")
        .about("Manage 3scale service metrics and toggle their enforcement")
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .num_args(1)
                .global(true)
                .help("Override RUST_LOG level (e.g., info, debug)"),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .help("Print version and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("service")
                .long("service")
                .short('s')
                .num_args(1)
                .global(true)
                .value_parser(clap::value_parser!(u64))
                .help("Id of the service owning the metrics"),
        )
        .subcommand(Command::new("list").about("List the metrics of a service"))
        .subcommand(
            Command::new("show")
                .about("Show one metric")
                .arg(metric_ref_arg()),
        )
        .subcommand(
            attr_args(
                Command::new("create").about("Create a metric").arg(
                    Arg::new("system-name")
                        .long("system-name")
                        .required(true)
                        .num_args(1)
                        .help("Stable identifier of the metric"),
                ),
            )
            .mut_arg("friendly-name", |a| a.required(true)),
        )
        .subcommand(attr_args(
            Command::new("update")
                .about("Update attributes of a metric")
                .arg(metric_ref_arg()),
        ))
        .subcommand(
            Command::new("delete")
                .about("Delete a metric")
                .arg(metric_ref_arg()),
        )
        .subcommand(
            Command::new("enable")
                .about("Lift the zero eternity limit from every plan")
                .arg(metric_ref_arg()),
        )
        .subcommand(
            Command::new("disable")
                .about("Set a zero eternity limit on every plan")
                .arg(metric_ref_arg()),
        )
        .subcommand(
            Command::new("status")
                .about("Report per-plan enforcement state")
                .arg(metric_ref_arg()),
        )
}

pub fn init_logging(level: Option<&str>) {
    // Explicit level wins over RUST_LOG; default to info.
    let mut builder = match level {
        Some(lvl) => {
            let mut b = env_logger::Builder::new();
            b.parse_filters(lvl);
            b
        }
        None => env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")),
    };
    builder.init();
}

fn collect_attrs(matches: &ArgMatches) -> Attrs {
    let mut attrs = Attrs::new();
    for (arg, key) in [
        ("system-name", "system_name"),
        ("friendly-name", "friendly_name"),
        ("unit", "unit"),
        ("description", "description"),
    ] {
        if let Ok(Some(value)) = matches.try_get_one::<String>(arg) {
            attrs.insert(key.to_string(), Value::String(value.clone()));
        }
    }
    attrs
}

fn metric_ref(matches: &ArgMatches) -> anyhow::Result<MetricRef> {
    let raw = matches
        .get_one::<String>("metric")
        .ok_or_else(|| anyhow!("missing metric reference"))?;
    Ok(raw.parse()?)
}

async fn lookup<'a>(service: &'a Service, reference: &MetricRef) -> anyhow::Result<Metric<'a>> {
    Metric::find(service, reference)
        .await?
        .ok_or_else(|| anyhow!("Metric '{}' not found in service {}", reference, service.id()))
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn run(api: AdminApi, matches: &ArgMatches) -> anyhow::Result<()> {
    let Some((name, sub)) = matches.subcommand() else {
        build_cli().print_help()?;
        return Ok(());
    };
    let service_id = *matches
        .get_one::<u64>("service")
        .context("--service is required")?;
    let service = Service::new(service_id, api);

    match name {
        "list" => {
            let mut items = Vec::new();
            for mut metric in Metric::list(&service).await? {
                items.push(Value::Object(metric.attrs().await?.clone()));
            }
            print_json(&json!({ "metrics": items }))
        }
        "show" => {
            let mut metric = lookup(&service, &metric_ref(sub)?).await?;
            print_json(&Value::Object(metric.attrs().await?.clone()))
        }
        "create" => {
            let mut metric = Metric::create(&service, &collect_attrs(sub)).await?;
            print_json(&Value::Object(metric.attrs().await?.clone()))
        }
        "update" => {
            let mut metric = lookup(&service, &metric_ref(sub)?).await?;
            let updated = metric.update(&collect_attrs(sub)).await?;
            print_json(&Value::Object(updated.clone()))
        }
        "delete" => {
            let metric = lookup(&service, &metric_ref(sub)?).await?;
            let id = metric.id();
            metric.delete().await?;
            print_json(&json!({ "deleted": id }))
        }
        "enable" | "disable" => {
            let metric = lookup(&service, &metric_ref(sub)?).await?;
            if name == "enable" {
                metric.enable().await?;
            } else {
                metric.disable().await?;
            }
            print_json(&json!({ "metric": metric.id(), "enabled": name == "enable" }))
        }
        "status" => {
            let metric = lookup(&service, &metric_ref(sub)?).await?;
            let mut plans = Vec::new();
            for plan in metric.service_plans().await? {
                let disabled = metric.is_disabled_in(&plan).await?;
                plans.push(json!({ "plan": plan.id(), "enabled": !disabled }));
            }
            print_json(&json!({ "metric": metric.id(), "plans": plans }))
        }
        other => Err(anyhow!("Unknown command: {}", other)),
    }
}
