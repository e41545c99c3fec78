//! Metrics collection using sysinfo for reactor_agent.

use crate::gpu::GpuProbe;
use crate::types::{percent, Cpu, Disk, Gpu, Net, Ram, Snapshot, Swap};
use once_cell::sync::OnceCell;
#[cfg(target_os = "linux")]
use std::fs;
use std::path::Path;
use std::time::Instant;
use sysinfo::{Components, CpuRefreshKind, Disks, MemoryRefreshKind, Networks, RefreshKind, System};
use tracing::{debug, warn};

const GIB: f32 = 1024.0 * 1024.0 * 1024.0;
const MIB: f32 = 1024.0 * 1024.0;

// Runtime toggles (read once)
pub fn gpu_enabled() -> bool {
    static ON: OnceCell<bool> = OnceCell::new();
    *ON.get_or_init(|| {
        std::env::var("REACTOR_AGENT_GPU")
            .map(|v| v != "0")
            .unwrap_or(true)
    })
}
pub fn temp_enabled() -> bool {
    static ON: OnceCell<bool> = OnceCell::new();
    *ON.get_or_init(|| {
        std::env::var("REACTOR_AGENT_TEMP")
            .map(|v| v != "0")
            .unwrap_or(true)
    })
}

/// Anything that can produce one snapshot per tick.
pub trait SnapshotSource {
    fn sample(&mut self) -> Snapshot;
}

/// Persistent sysinfo handles plus the optional power/fan/GPU probes.
pub struct Collector {
    sys: System,
    components: Components,
    disks: Disks,
    networks: Networks,
    gpu: GpuProbe,
    energy: EnergyMeter,
    temps: bool,
}

impl Collector {
    pub fn new() -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::everything())
            .with_memory(MemoryRefreshKind::everything());
        let temps = temp_enabled();
        Self {
            sys: System::new_with_specifics(refresh_kind),
            components: if temps {
                Components::new_with_refreshed_list()
            } else {
                Components::new()
            },
            disks: Disks::new_with_refreshed_list(),
            networks: Networks::new_with_refreshed_list(),
            gpu: GpuProbe::new(gpu_enabled()),
            energy: EnergyMeter::default(),
            temps,
        }
    }

    fn cpu(&mut self) -> Cpu {
        let temp = if self.temps {
            self.components.refresh(false);
            pick_cpu_temp(self.components.iter().map(|c| (c.label(), c.temperature())))
        } else {
            0.0
        };
        Cpu {
            load: self.sys.global_cpu_usage(),
            temp,
            freq: self.sys.cpus().first().map(|c| c.frequency() as f32).unwrap_or(0.0),
            pwr: self.energy.sample(Instant::now()),
            fan: read_fan_rpm(),
            cores: self.sys.cpus().iter().map(|c| c.cpu_usage()).collect(),
        }
    }

    fn memory(&self) -> (Ram, Swap) {
        let (used, total) = (self.sys.used_memory() as f32, self.sys.total_memory() as f32);
        let (sused, stotal) = (self.sys.used_swap() as f32, self.sys.total_swap() as f32);
        (
            Ram {
                used: used / GIB,
                total: total / GIB,
                p: percent(used, total),
            },
            Swap {
                used: sused / GIB,
                total: stotal / GIB,
                p: percent(sused, stotal),
            },
        )
    }

    fn gpu(&mut self) -> Gpu {
        match self.gpu.read() {
            Ok(Some(r)) => Gpu {
                gpu_load: r.load,
                vram_used: r.vram_used_mib,
                vram_total: r.vram_total_mib,
                vram_p: percent(r.vram_used_mib, r.vram_total_mib),
                gpu_temp: r.temp,
                gpu_pwr: r.pwr,
                gpu_fan: r.fan,
            },
            Ok(None) => Gpu::default(),
            Err(e) => {
                debug!("{e}");
                Gpu::default()
            }
        }
    }

    fn disk(&mut self) -> Disk {
        self.disks.refresh(false);
        let mounts: Vec<(&Path, u64, u64)> = self
            .disks
            .list()
            .iter()
            .map(|d| (d.mount_point(), d.total_space(), d.available_space()))
            .collect();
        Disk {
            p: disk_used_percent(&mounts),
        }
    }

    fn net(&mut self) -> Net {
        self.networks.refresh(false);
        let (mut rx, mut tx) = (0u64, 0u64);
        for (_, data) in self.networks.iter() {
            rx = rx.saturating_add(data.total_received());
            tx = tx.saturating_add(data.total_transmitted());
        }
        Net {
            sent: tx as f32 / MIB,
            recv: rx as f32 / MIB,
        }
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotSource for Collector {
    fn sample(&mut self) -> Snapshot {
        let sys = &mut self.sys;
        if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            sys.refresh_cpu_all();
            sys.refresh_memory();
        })) {
            warn!("sysinfo selective refresh panicked: {e:?}");
        }
        let cpu = self.cpu();
        let (ram, swap) = self.memory();
        Snapshot {
            cpu,
            ram,
            swap,
            gpu: self.gpu(),
            disk: self.disk(),
            net: self.net(),
        }
        .normalized()
    }
}

fn is_cpu_sensor(label: &str) -> bool {
    let l = label.to_ascii_lowercase();
    ["cpu", "package", "tctl", "tdie", "coretemp", "k10temp", "zenpower"]
        .iter()
        .any(|k| l.contains(k))
}

/// Mean of CPU-labelled sensors; otherwise the first sensor with a reading;
/// otherwise 0.
pub fn pick_cpu_temp<'a, I>(sensors: I) -> f32
where
    I: IntoIterator<Item = (&'a str, Option<f32>)>,
{
    let mut first = None;
    let (mut sum, mut n) = (0.0f32, 0u32);
    for (label, temp) in sensors {
        let Some(t) = temp.filter(|t| t.is_finite()) else {
            continue;
        };
        first.get_or_insert(t);
        if is_cpu_sensor(label) {
            sum += t;
            n += 1;
        }
    }
    if n > 0 {
        sum / n as f32
    } else {
        first.unwrap_or(0.0)
    }
}

/// Used percent of the root filesystem (first disk on Windows); aggregate
/// over all disks when there is no such mount.
pub fn disk_used_percent(mounts: &[(&Path, u64, u64)]) -> f32 {
    let used = |total: u64, avail: u64| total.saturating_sub(avail) as f32;
    #[cfg(windows)]
    let primary = mounts.first();
    #[cfg(not(windows))]
    let primary = mounts.iter().find(|(m, _, _)| *m == Path::new("/"));
    if let Some((_, total, avail)) = primary {
        return percent(used(*total, *avail), *total as f32);
    }
    let (total, avail) = mounts
        .iter()
        .fold((0u64, 0u64), |(t, a), (_, dt, da)| (t.saturating_add(*dt), a.saturating_add(*da)));
    percent(used(total, avail), total as f32)
}

/// Average power in watts between two cumulative energy readings (µJ).
/// A counter that went backwards (wrap or reset) yields 0.
pub fn energy_watts(prev_uj: u64, prev_at: Instant, now_uj: u64, now_at: Instant) -> f32 {
    let secs = now_at.saturating_duration_since(prev_at).as_secs_f32();
    if now_uj < prev_uj || secs <= 0.0 {
        return 0.0;
    }
    (now_uj - prev_uj) as f32 / 1_000_000.0 / secs
}

// RAPL package energy counter; reports 0 where there is none
#[derive(Default)]
struct EnergyMeter {
    last: Option<(u64, Instant)>,
}

impl EnergyMeter {
    fn sample(&mut self, now: Instant) -> f32 {
        let Some(uj) = read_energy_uj() else {
            return 0.0;
        };
        let watts = match self.last {
            Some((prev, at)) => energy_watts(prev, at, uj, now),
            None => 0.0,
        };
        self.last = Some((uj, now));
        watts
    }
}

#[cfg(target_os = "linux")]
fn read_energy_uj() -> Option<u64> {
    fs::read_to_string("/sys/class/powercap/intel-rapl/intel-rapl:0/energy_uj")
        .ok()?
        .trim()
        .parse()
        .ok()
}

#[cfg(not(target_os = "linux"))]
fn read_energy_uj() -> Option<u64> {
    None
}

/// First non-zero RPM among hwmon `fan*_input` readings.
pub fn first_fan_rpm<'a, I>(readings: I) -> Option<u32>
where
    I: IntoIterator<Item = &'a str>,
{
    readings
        .into_iter()
        .filter_map(|s| s.trim().parse::<u32>().ok())
        .find(|rpm| *rpm > 0)
}

#[cfg(target_os = "linux")]
fn read_fan_rpm() -> Option<u32> {
    let mut inputs = Vec::new();
    for hw in fs::read_dir("/sys/class/hwmon").ok()?.flatten() {
        let Ok(entries) = fs::read_dir(hw.path()) else {
            continue;
        };
        for e in entries.flatten() {
            let name = e.file_name();
            let name = name.to_string_lossy();
            if name.starts_with("fan") && name.ends_with("_input") {
                inputs.push(e.path());
            }
        }
    }
    inputs.sort();
    let readings: Vec<String> = inputs
        .iter()
        .filter_map(|p| fs::read_to_string(p).ok())
        .collect();
    first_fan_rpm(readings.iter().map(String::as_str))
}

#[cfg(not(target_os = "linux"))]
fn read_fan_rpm() -> Option<u32> {
    None
}
