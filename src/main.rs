mod cli;

use threescale_metrics::config::Config;
use threescale_metrics::http::AdminApi;

#[tokio::main(flavor = "current_thread")] // plan mutations run one at a time
async fn main() -> anyhow::Result<()> {
    let cmd = cli::build_cli();
    let matches = cmd.get_matches();
    let log_level = matches.get_one::<String>("log-level").cloned();
    let version_flag = matches.get_flag("version");

    cli::init_logging(log_level.as_deref());

    if version_flag {
        println!("threescale-metrics {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let cfg = Config::from_env().map_err(anyhow::Error::msg)?;
    let api = AdminApi::new(cfg)?;
    cli::run(api, &matches).await
}
