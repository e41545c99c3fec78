//! Synthetic telemetry feed for running the emulator without a host agent.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use reactor_display::SerialRx;
use serde_json::json;

const PERIOD: Duration = Duration::from_secs(1);

/// Produces one record per second, framed exactly as the agent frames them.
pub struct DemoFeed {
    started: Instant,
    emitted: u32,
    pending: VecDeque<u8>,
}

impl DemoFeed {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            emitted: 0,
            pending: VecDeque::new(),
        }
    }
}

// slow triangle wave in 0..=100 with a per-channel phase
fn wave(step: u32, phase: u32) -> f32 {
    let t = (step * 7 + phase * 13) % 200;
    let v = if t > 100 { 200 - t } else { t };
    v as f32
}

/// Record for the `step`-th demo tick.
pub fn demo_record(step: u32) -> String {
    let cores: Vec<f32> = (0..12).map(|i| wave(step, i)).collect();
    let load = cores.iter().sum::<f32>() / cores.len() as f32;
    json!({
        "cpu": {
            "load": load,
            "temp": 40.0 + load / 2.0,
            "freq": 3400.0,
            "pwr": 15.0 + load / 3.0,
            "fan": 900 + step % 300,
            "cores": cores,
        },
        "ram": { "used": 9.4, "total": 31.2, "p": 30.1 },
        "swap": { "used": 0.5, "total": 8.0, "p": wave(step, 40) * 0.7 },
        "gpu": {
            "gpu_load": wave(step, 20),
            "vram_used": 2048.0 + wave(step, 25) * 40.0,
            "vram_total": 8192.0,
            "vram_p": 0.0,
            "gpu_temp": 55.0,
            "gpu_pwr": 80.0,
            "gpu_fan": 35,
        },
        "disk": { "p": 71.0 },
        "net": { "sent": 120.4 + step as f32, "recv": 980.2 + step as f32 * 3.0 },
    })
    .to_string()
}

impl SerialRx for DemoFeed {
    fn poll_byte(&mut self) -> Option<u8> {
        if self.pending.is_empty() && self.started.elapsed() >= PERIOD * self.emitted {
            let mut line = demo_record(self.emitted).into_bytes();
            line.push(b'\n');
            self.pending.extend(line);
            self.emitted += 1;
        }
        self.pending.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_records_decode() {
        for step in [0, 1, 57, 1_000] {
            let s = reactor_display::decode_record(demo_record(step).as_bytes()).unwrap();
            assert_eq!(s.cpu.cores.len(), 12);
            assert!(s.cpu.cores.iter().all(|c| (0.0..=100.0).contains(c)));
            assert_eq!(s.gpu.vram_total, 8192.0);
        }
    }
}
