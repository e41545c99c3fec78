//! Data types written to the panel, one JSON object per line.
//! Keep this module minimal and stable; it defines the wire format.

use serde::Serialize;

/// Per-core loads past this count are not sent.
pub const MAX_CORES: usize = 16;

#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct Cpu {
    pub load: f32,
    pub temp: f32,
    pub freq: f32,
    pub pwr: f32,
    // RPM
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fan: Option<u32>,
    pub cores: Vec<f32>,
}

#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct Ram {
    // GiB
    pub used: f32,
    pub total: f32,
    pub p: f32,
}

#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct Swap {
    // GiB
    pub used: f32,
    pub total: f32,
    pub p: f32,
}

#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct Gpu {
    pub gpu_load: f32,
    // MiB
    pub vram_used: f32,
    pub vram_total: f32,
    pub vram_p: f32,
    pub gpu_temp: f32,
    pub gpu_pwr: f32,
    // percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu_fan: Option<u32>,
}

#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct Disk {
    pub p: f32,
}

#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct Net {
    // MiB since boot
    pub sent: f32,
    pub recv: f32,
}

#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub cpu: Cpu,
    pub ram: Ram,
    pub swap: Swap,
    pub gpu: Gpu,
    pub disk: Disk,
    pub net: Net,
}

/// One decimal place; NaN and infinities become 0 so every field stays a
/// JSON number.
pub fn round1(v: f32) -> f32 {
    if v.is_finite() {
        (v * 10.0).round() / 10.0
    } else {
        0.0
    }
}

/// `part / whole` as a percentage, 0 when `whole` is 0.
pub fn percent(part: f32, whole: f32) -> f32 {
    if whole > 0.0 {
        (part / whole * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

impl Snapshot {
    /// Final form sent on the wire: cores capped at [`MAX_CORES`], floats
    /// rounded to one decimal.
    pub fn normalized(mut self) -> Self {
        self.cpu.cores.truncate(MAX_CORES);
        let Snapshot { cpu, ram, swap, gpu, disk, net } = &mut self;
        for v in [&mut cpu.load, &mut cpu.temp, &mut cpu.freq, &mut cpu.pwr]
            .into_iter()
            .chain(cpu.cores.iter_mut())
            .chain([&mut ram.used, &mut ram.total, &mut ram.p])
            .chain([&mut swap.used, &mut swap.total, &mut swap.p])
            .chain([
                &mut gpu.gpu_load,
                &mut gpu.vram_used,
                &mut gpu.vram_total,
                &mut gpu.vram_p,
                &mut gpu.gpu_temp,
                &mut gpu.gpu_pwr,
            ])
            .chain([&mut disk.p, &mut net.sent, &mut net.recv])
        {
            *v = round1(*v);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_caps_cores_and_rounds() {
        let s = Snapshot {
            cpu: Cpu {
                load: 12.345,
                temp: f32::NAN,
                cores: (0..20).map(|i| i as f32 + 0.26).collect(),
                ..Cpu::default()
            },
            net: Net { sent: f32::INFINITY, recv: 1.04 },
            ..Snapshot::default()
        }
        .normalized();
        assert_eq!(s.cpu.cores.len(), MAX_CORES);
        assert_eq!(s.cpu.cores[15], 15.3);
        assert_eq!(s.cpu.load, 12.3);
        assert_eq!(s.cpu.temp, 0.0);
        assert_eq!((s.net.sent, s.net.recv), (0.0, 1.0));
    }

    #[test]
    fn unknown_fans_are_omitted() {
        let json = serde_json::to_string(&Snapshot::default()).unwrap();
        assert!(!json.contains("fan"));
        let mut s = Snapshot::default();
        s.gpu.gpu_fan = Some(40);
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains(r#""gpu_fan":40"#));
    }

    #[test]
    fn percent_guards_zero_totals() {
        assert_eq!(percent(3.0, 0.0), 0.0);
        assert_eq!(percent(4.0, 16.0), 25.0);
        assert_eq!(percent(20.0, 16.0), 100.0);
    }
}
