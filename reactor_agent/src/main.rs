//! reactor_agent: streams host telemetry to the serial-attached panel.

use std::env;
use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use reactor_agent::config::{config_path, load_config, parse_args};
use reactor_agent::{encode_record, Collector, Link, Sampler, SerialOpener, SnapshotSource, SystemPorts};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = match parse_args(env::args()) {
        Ok(v) => v,
        Err(msg) => {
            eprintln!("{msg}");
            return Ok(());
        }
    };

    // stdout is reserved for --once / --print-config output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let config = load_config().merge(&cli);
    if cli.print_config {
        println!("# {}", config_path().display());
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let mut collector = Collector::new();
    if cli.once {
        // cpu usage needs two refreshes some time apart
        collector.sample();
        thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        let record = encode_record(&collector.sample())?;
        let mut out = io::stdout().lock();
        out.write_all(&record)?;
        out.flush()?;
        return Ok(());
    }

    info!(
        port = config.port.as_deref().unwrap_or("auto"),
        baud = config.baud,
        interval_ms = config.interval_ms,
        policy = ?config.retry_policy(),
        "reactor_agent starting"
    );
    let link = Link::new(config.port.clone(), config.baud, SystemPorts, SerialOpener::default());
    let mut sampler = Sampler::new(collector, link, config.retry_policy());
    sampler.run(Duration::from_millis(config.interval_ms))
}
