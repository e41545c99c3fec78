//! Records written by the agent decode on the panel side into the same values.

use reactor_agent::types::{Cpu, Disk, Gpu, Net, Ram, Swap};
use reactor_agent::{encode_record, Snapshot, MAX_CORES};

fn decode(record: &[u8]) -> reactor_display::Snapshot {
    let line = record.strip_suffix(b"\n").expect("terminated record");
    reactor_display::decode_record(line).expect("panel decodes agent record")
}

fn busy_host() -> Snapshot {
    Snapshot {
        cpu: Cpu {
            load: 47.25,
            temp: 66.0,
            freq: 4_200.0,
            pwr: 35.5,
            fan: Some(1_450),
            cores: (0..24).map(|i| (i * 4) as f32).collect(),
        },
        ram: Ram { used: 12.5, total: 31.3, p: 39.9 },
        swap: Swap { used: 1.0, total: 8.0, p: 12.5 },
        gpu: Gpu {
            gpu_load: 88.0,
            vram_used: 6_144.0,
            vram_total: 8_192.0,
            vram_p: 75.0,
            gpu_temp: 71.0,
            gpu_pwr: 180.2,
            gpu_fan: Some(55),
        },
        disk: Disk { p: 91.0 },
        net: Net { sent: 512.25, recv: 20_480.5 },
    }
    .normalized()
}

#[test]
fn every_field_survives_the_link() {
    let host = busy_host();
    let panel = decode(&encode_record(&host).unwrap());

    assert_eq!(panel.cpu.load, host.cpu.load);
    assert_eq!(panel.cpu.temp, 66.0);
    assert_eq!(panel.cpu.freq, 4_200.0);
    assert_eq!(panel.cpu.pwr, 35.5);
    assert_eq!(panel.cpu.fan, 1_450.0);
    assert_eq!(panel.cpu.cores, host.cpu.cores);
    assert_eq!((panel.ram.used, panel.ram.total, panel.ram.p), (12.5, 31.3, 39.9));
    assert_eq!((panel.swap.used, panel.swap.total, panel.swap.p), (1.0, 8.0, 12.5));
    assert_eq!(panel.gpu.gpu_load, 88.0);
    assert_eq!(panel.gpu.vram_p, host.gpu.vram_p);
    assert_eq!((panel.gpu.vram_used, panel.gpu.vram_total), (6_144.0, 8_192.0));
    assert_eq!(panel.gpu.vram_percent(), 75.0);
    assert_eq!((panel.gpu.gpu_temp, panel.gpu.gpu_pwr, panel.gpu.gpu_fan), (71.0, 180.2, 55.0));
    assert_eq!(panel.disk.p, 91.0);
    assert_eq!((panel.net.sent, panel.net.recv), (host.net.sent, host.net.recv));
}

#[test]
fn extra_cores_are_dropped_before_sending() {
    let host = busy_host();
    assert_eq!(host.cpu.cores.len(), MAX_CORES);
    let panel = decode(&encode_record(&host).unwrap());
    assert_eq!(panel.cpu.cores.len(), MAX_CORES);
    assert_eq!(panel.cpu.cores[MAX_CORES - 1], 60.0);
}

#[test]
fn host_without_gpu_or_fans_reads_zero_on_the_panel() {
    let mut host = busy_host();
    host.gpu = Gpu::default();
    host.cpu.fan = None;
    let record = encode_record(&host).unwrap();
    assert!(!String::from_utf8_lossy(&record).contains("fan"));

    let panel = decode(&record);
    assert_eq!(panel.gpu, reactor_display::types::Gpu::default());
    assert_eq!(panel.cpu.fan, 0.0);
    assert_eq!(panel.gpu.vram_percent(), 0.0);
}

#[test]
fn both_sides_agree_on_the_record_limit() {
    assert_eq!(reactor_agent::MAX_RECORD_BYTES, reactor_display::MAX_RECORD_BYTES);
    assert_eq!(reactor_agent::MAX_CORES, reactor_display::MAX_CORES);
}
