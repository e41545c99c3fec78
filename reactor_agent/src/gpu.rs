// gpu.rs
use gfxinfo::active_gpu;
use nvml_wrapper::{enum_wrappers::device::TemperatureSensor, Nvml};
use tracing::{debug, info};

use crate::error::MetricError;

const MIB: f32 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpuReading {
    pub load: f32,
    pub vram_used_mib: f32,
    pub vram_total_mib: f32,
    pub temp: f32,
    pub pwr: f32,
    pub fan: Option<u32>,
}

enum Backend {
    Unprobed,
    Nvml(Nvml),
    Gfx,
    Absent,
}

/// First GPU on the host. The backend is chosen on the first read (NVML,
/// then `gfxinfo`); if neither finds a GPU, later reads skip probing.
pub struct GpuProbe {
    backend: Backend,
    probe: fn() -> Backend,
}

impl GpuProbe {
    pub fn new(enabled: bool) -> Self {
        Self {
            backend: if enabled { Backend::Unprobed } else { Backend::Absent },
            probe,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self.backend, Backend::Absent)
    }

    /// `Ok(None)` when the host has no GPU.
    pub fn read(&mut self) -> Result<Option<GpuReading>, MetricError> {
        if matches!(self.backend, Backend::Unprobed) {
            self.backend = (self.probe)();
        }
        match &self.backend {
            Backend::Nvml(nvml) => read_nvml(nvml).map(Some),
            Backend::Gfx => read_gfx().map(Some),
            Backend::Absent | Backend::Unprobed => Ok(None),
        }
    }
}

fn probe() -> Backend {
    match Nvml::init() {
        Ok(nvml) => match read_nvml(&nvml) {
            Ok(_) => {
                info!("gpu: using NVML");
                return Backend::Nvml(nvml);
            }
            Err(e) => debug!("gpu: NVML loaded but unusable: {e}"),
        },
        Err(e) => debug!("gpu: NVML unavailable: {e}"),
    }
    match read_gfx() {
        Ok(_) => {
            info!("gpu: using gfxinfo");
            Backend::Gfx
        }
        Err(e) => {
            info!("gpu: none found ({e}); reporting zeros");
            Backend::Absent
        }
    }
}

fn read_nvml(nvml: &Nvml) -> Result<GpuReading, MetricError> {
    let dev = nvml
        .device_by_index(0)
        .map_err(|e| MetricError::unavailable("nvml", e))?;
    let util = dev
        .utilization_rates()
        .map_err(|e| MetricError::unavailable("nvml", e))?;
    let mem = dev
        .memory_info()
        .map_err(|e| MetricError::unavailable("nvml", e))?;
    Ok(GpuReading {
        load: util.gpu as f32,
        vram_used_mib: mem.used as f32 / MIB,
        vram_total_mib: mem.total as f32 / MIB,
        // optional sensors: zero/absent rather than failing the whole reading
        temp: dev.temperature(TemperatureSensor::Gpu).map(|t| t as f32).unwrap_or(0.0),
        pwr: dev.power_usage().map(|mw| mw as f32 / 1000.0).unwrap_or(0.0),
        fan: dev.fan_speed(0).ok(),
    })
}

fn read_gfx() -> Result<GpuReading, MetricError> {
    let gpu = active_gpu().map_err(|e| MetricError::unavailable("gfxinfo", e))?;
    let info = gpu.info();
    Ok(GpuReading {
        load: info.load_pct() as f32,
        vram_used_mib: info.used_vram() as f32 / MIB,
        vram_total_mib: info.total_vram() as f32 / MIB,
        ..GpuReading::default()
    })
}
