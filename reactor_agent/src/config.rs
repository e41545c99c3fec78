//! Agent settings: defaults, then the optional config file, then CLI flags.
//! The file lives at $XDG_CONFIG_HOME/reactor_agent/config.json (fallback
//! ~/.config/reactor_agent/config.json).

use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path, path::PathBuf};
use tracing::warn;

use crate::sampler::RetryPolicy;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Fixed device path; discovery is skipped when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    pub baud: u32,
    pub interval_ms: u64,
    pub backoff: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud: 115_200,
            interval_ms: 1_000,
            backoff: false,
        }
    }
}

impl AgentConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        if self.backoff {
            RetryPolicy::backoff()
        } else {
            RetryPolicy::EveryTick
        }
    }

    /// Flags given on the command line win over file values.
    pub fn merge(mut self, cli: &CliArgs) -> Self {
        if let Some(p) = &cli.port {
            self.port = Some(p.clone());
        }
        if let Some(b) = cli.baud {
            self.baud = b;
        }
        if let Some(ms) = cli.interval_ms {
            self.interval_ms = ms;
        }
        self.backoff |= cli.backoff;
        self
    }
}

pub fn config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(xdg).join("reactor_agent")
    } else {
        dirs_next::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("reactor_agent")
    }
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Missing file means defaults; an unreadable or malformed one is logged and
/// also falls back to defaults.
pub fn load_config_from(path: &Path) -> AgentConfig {
    match fs::read_to_string(path) {
        Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
            warn!("ignoring malformed config {}: {e}", path.display());
            AgentConfig::default()
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => AgentConfig::default(),
        Err(e) => {
            warn!("cannot read config {}: {e}", path.display());
            AgentConfig::default()
        }
    }
}

pub fn load_config() -> AgentConfig {
    load_config_from(&config_path())
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub port: Option<String>,
    pub baud: Option<u32>,
    pub interval_ms: Option<u64>,
    pub backoff: bool,
    pub once: bool,
    pub print_config: bool,
}

pub fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} [--port PATH|-p PATH] [--baud RATE|-b RATE] [--interval-ms MS] [--backoff] \
         [--once] [--print-config]\n\
         Config file: {}",
        config_path().display()
    )
}

/// `Err` carries the text to print: usage for `--help`, or a usage error.
pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<CliArgs, String> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "reactor_agent".into());
    let mut cli = CliArgs::default();

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
            "--port" | "-p" => cli.port = Some(value("--port")?),
            "--baud" | "-b" => {
                let v = value("--baud")?;
                cli.baud = Some(
                    v.parse()
                        .map_err(|_| format!("invalid baud rate '{v}'\n{}", usage(&prog)))?,
                );
            }
            "--interval-ms" => {
                let v = value("--interval-ms")?;
                match v.parse::<u64>() {
                    Ok(ms) if ms > 0 => cli.interval_ms = Some(ms),
                    _ => return Err(format!("invalid interval '{v}'\n{}", usage(&prog))),
                }
            }
            "--backoff" => cli.backoff = true,
            "--once" => cli.once = true,
            "--print-config" => cli.print_config = true,
            _ => return Err(format!("Unexpected argument '{arg}'. {}", usage(&prog))),
        }
    }
    Ok(cli)
}
