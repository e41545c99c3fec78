//! Entry point for the panel emulator. Parses args, sets up file logging and
//! runs the device loop inside the terminal.

mod app;
mod demo;
mod term;

use std::env;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use reactor_display::{DeviceConfig, DrawStrategy, RedrawPolicy, Screen};
use tracing_subscriber::EnvFilter;

const DEFAULT_BAUD: u32 = 115_200;

#[derive(Debug, PartialEq)]
struct ParsedArgs {
    port: Option<String>,
    baud: u32,
    demo: bool,
    direct: bool,
    every_loop: bool,
    screen: Screen,
    log_file: Option<PathBuf>,
}

fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} [--port PATH|-p PATH] [--baud RATE|-b RATE] [--demo] [--direct] \
         [--every-loop] [--screen stats|reactor] [--log-file PATH]\n\
         Keys: space/b = button, q/Esc = quit. Click left/right edge = touch."
    )
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<ParsedArgs, String> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "reactor_display".into());
    let mut parsed = ParsedArgs {
        port: None,
        baud: DEFAULT_BAUD,
        demo: false,
        direct: false,
        every_loop: false,
        screen: Screen::Reactor,
        log_file: None,
    };

    while let Some(arg) = it.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((f, v)) if f.starts_with("--") => (f.to_string(), Some(v.to_string())),
            _ => (arg.clone(), None),
        };
        let mut value = |name: &str| {
            inline
                .clone()
                .or_else(|| it.next())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| format!("{name} needs a value\n{}", usage(&prog)))
        };
        match flag.as_str() {
            "-h" | "--help" => return Err(usage(&prog)),
            "--port" | "-p" => parsed.port = Some(value("--port")?),
            "--baud" | "-b" => {
                let v = value("--baud")?;
                parsed.baud = v
                    .parse()
                    .map_err(|_| format!("invalid baud rate '{v}'\n{}", usage(&prog)))?;
            }
            "--screen" => {
                parsed.screen = match value("--screen")?.as_str() {
                    "stats" => Screen::Stats,
                    "reactor" => Screen::Reactor,
                    other => return Err(format!("unknown screen '{other}'\n{}", usage(&prog))),
                };
            }
            "--log-file" => parsed.log_file = Some(PathBuf::from(value("--log-file")?)),
            "--demo" => parsed.demo = true,
            "--direct" => parsed.direct = true,
            "--every-loop" => parsed.every_loop = true,
            _ => return Err(format!("Unexpected argument '{arg}'. {}", usage(&prog))),
        }
    }
    Ok(parsed)
}

fn default_log_path() -> PathBuf {
    dirs_next::data_local_dir()
        .unwrap_or_else(env::temp_dir)
        .join("reactor_display")
        .join("display.log")
}

// The terminal belongs to the panel, so logs go to a file.
fn init_logging(path: &Path) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let parsed = match parse_args(env::args()) {
        Ok(v) => v,
        Err(msg) => {
            eprintln!("{msg}");
            return Ok(());
        }
    };
    if parsed.port.is_none() && !parsed.demo {
        eprintln!("No serial port given; pass --port PATH or --demo.");
        return Ok(());
    }

    let log_path = parsed.log_file.clone().unwrap_or_else(default_log_path);
    init_logging(&log_path)?;

    let config = DeviceConfig {
        strategy: if parsed.direct {
            DrawStrategy::Direct
        } else {
            DrawStrategy::Buffered
        },
        redraw: if parsed.every_loop {
            RedrawPolicy::EveryIteration
        } else {
            DeviceConfig::default().redraw
        },
        initial_screen: parsed.screen,
        ..DeviceConfig::default()
    };

    match parsed.port {
        Some(path) if !parsed.demo => {
            let rx = term::PortRx::open(&path, parsed.baud)
                .with_context(|| format!("opening serial port {path}"))?;
            tracing::info!(port = %path, baud = parsed.baud, "listening for telemetry");
            app::run(rx, config)
        }
        _ => {
            tracing::info!("demo feed");
            app::run(demo::DemoFeed::new(), config)
        }
    }
}
