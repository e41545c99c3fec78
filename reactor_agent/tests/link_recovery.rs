//! Discovery, write failure and reconnect, driven through mock ports.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use reactor_agent::{
    Link, LinkError, PortCandidate, PortEnumerator, PortOpener, RetryPolicy, Sampler, Snapshot, SnapshotSource,
    TickOutcome, UsbIdentity,
};

#[derive(Clone, Default)]
struct Bus {
    ports: Arc<Mutex<Vec<PortCandidate>>>,
    scans: Arc<AtomicUsize>,
    opened: Arc<Mutex<Vec<String>>>,
    written: Arc<Mutex<Vec<u8>>>,
    broken: Arc<AtomicBool>,
}

impl Bus {
    fn plug(&self, path: &str, vid: u16, pid: u16) {
        self.ports.lock().unwrap().push(PortCandidate {
            path: path.into(),
            usb: Some(UsbIdentity { vid, pid }),
        });
    }

    fn unplug_all(&self) {
        self.ports.lock().unwrap().clear();
    }

    fn scans(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    fn lines(&self) -> usize {
        self.written.lock().unwrap().iter().filter(|b| **b == b'\n').count()
    }
}

struct MockEnumerator(Bus);

impl PortEnumerator for MockEnumerator {
    fn candidates(&mut self) -> Result<Vec<PortCandidate>, LinkError> {
        self.0.scans.fetch_add(1, Ordering::SeqCst);
        Ok(self.0.ports.lock().unwrap().clone())
    }
}

struct MockOpener(Bus);

struct MockWriter(Bus);

impl Write for MockWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.0.broken.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"));
        }
        self.0.written.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl PortOpener for MockOpener {
    fn open(&mut self, path: &str, _baud: u32) -> Result<Box<dyn Write>, LinkError> {
        self.0.opened.lock().unwrap().push(path.to_string());
        Ok(Box::new(MockWriter(self.0.clone())))
    }
}

#[derive(Default)]
struct CountingSource {
    samples: usize,
}

impl SnapshotSource for CountingSource {
    fn sample(&mut self) -> Snapshot {
        self.samples += 1;
        let mut s = Snapshot::default();
        s.cpu.load = self.samples as f32;
        s
    }
}

type TestSampler = Sampler<CountingSource, MockEnumerator, MockOpener>;

fn sampler(bus: &Bus, explicit: Option<&str>, policy: RetryPolicy) -> TestSampler {
    let link = Link::new(
        explicit.map(String::from),
        115_200,
        MockEnumerator(bus.clone()),
        MockOpener(bus.clone()),
    );
    Sampler::new(CountingSource::default(), link, policy)
}

#[test]
fn no_matching_device_is_retried_every_tick_and_sampling_continues() {
    let bus = Bus::default();
    bus.plug("/dev/ttyUSB0", 0x0403, 0x6001);
    let mut s = sampler(&bus, None, RetryPolicy::EveryTick);
    let t0 = Instant::now();
    for i in 0..3 {
        assert_eq!(s.tick(t0 + Duration::from_secs(i)), TickOutcome::Disconnected);
    }
    assert_eq!(bus.scans(), 3);
    assert_eq!(s.source().samples, 3);
    assert!(!s.link().is_connected());
    assert!(bus.opened.lock().unwrap().is_empty());
}

#[test]
fn device_appearing_later_is_picked_up() {
    let bus = Bus::default();
    let mut s = sampler(&bus, None, RetryPolicy::EveryTick);
    let t0 = Instant::now();
    assert_eq!(s.tick(t0), TickOutcome::Disconnected);

    bus.plug("/dev/ttyS0", 0x0000, 0x0000);
    bus.plug("/dev/ttyACM0", 0x303A, 0x1001);
    assert_eq!(s.tick(t0 + Duration::from_secs(1)), TickOutcome::Sent);
    let session = s.link().session().unwrap();
    assert_eq!(session.path(), "/dev/ttyACM0");
    assert_eq!(session.identity(), Some(UsbIdentity { vid: 0x303A, pid: 0x1001 }));
    assert_eq!(bus.lines(), 1);

    // connected ticks do not rescan
    assert_eq!(s.tick(t0 + Duration::from_secs(2)), TickOutcome::Sent);
    assert_eq!(bus.scans(), 2);
    assert_eq!(bus.lines(), 2);
}

#[test]
fn write_failure_tears_down_and_rediscovers_immediately() {
    let bus = Bus::default();
    bus.plug("/dev/ttyUSB0", 0x10C4, 0xEA60);
    let mut s = sampler(&bus, None, RetryPolicy::EveryTick);
    let t0 = Instant::now();
    assert_eq!(s.tick(t0), TickOutcome::Sent);

    // cable pulled: the write fails and the port is gone from the bus
    bus.broken.store(true, Ordering::SeqCst);
    bus.unplug_all();
    let scans = bus.scans();
    assert_eq!(
        s.tick(t0 + Duration::from_secs(1)),
        TickOutcome::WriteFailed { reconnected: false }
    );
    assert_eq!(bus.scans(), scans + 1);
    assert!(!s.link().is_connected());

    assert_eq!(s.tick(t0 + Duration::from_secs(2)), TickOutcome::Disconnected);

    // plugged back in, enumerating under a new name
    bus.broken.store(false, Ordering::SeqCst);
    bus.plug("/dev/ttyUSB1", 0x10C4, 0xEA60);
    assert_eq!(s.tick(t0 + Duration::from_secs(3)), TickOutcome::Sent);
    assert_eq!(s.link().session().unwrap().path(), "/dev/ttyUSB1");
    assert_eq!(s.source().samples, 4);
}

#[test]
fn write_failure_with_device_still_present_reconnects_in_the_same_tick() {
    let bus = Bus::default();
    bus.plug("/dev/ttyUSB0", 0x1A86, 0x7523);
    let mut s = sampler(&bus, None, RetryPolicy::EveryTick);
    let t0 = Instant::now();
    assert_eq!(s.tick(t0), TickOutcome::Sent);

    bus.broken.store(true, Ordering::SeqCst);
    assert_eq!(
        s.tick(t0 + Duration::from_secs(1)),
        TickOutcome::WriteFailed { reconnected: true }
    );
    assert!(s.link().is_connected());
    bus.broken.store(false, Ordering::SeqCst);
    assert_eq!(s.tick(t0 + Duration::from_secs(2)), TickOutcome::Sent);
    assert_eq!(bus.opened.lock().unwrap().len(), 2);
}

#[test]
fn explicit_path_skips_discovery() {
    let bus = Bus::default();
    let mut s = sampler(&bus, Some("/dev/custom-panel"), RetryPolicy::EveryTick);
    assert_eq!(s.tick(Instant::now()), TickOutcome::Sent);
    assert_eq!(bus.scans(), 0);
    assert_eq!(*bus.opened.lock().unwrap(), vec!["/dev/custom-panel".to_string()]);
    assert_eq!(s.link().session().unwrap().identity(), None);
}

#[test]
fn backoff_spaces_out_discovery_attempts() {
    let bus = Bus::default();
    let mut s = sampler(&bus, None, RetryPolicy::backoff());
    let t0 = Instant::now();
    let at = |ms: u64| t0 + Duration::from_millis(ms);

    for ms in [0, 500, 1_000, 2_000, 3_000, 4_000, 6_000, 7_000] {
        assert_eq!(s.tick(at(ms)), TickOutcome::Disconnected);
    }
    // attempts at 0, 1000 (+1s), 3000 (+2s) and 7000 (+4s)
    assert_eq!(bus.scans(), 4);
    assert_eq!(s.source().samples, 8);

    bus.plug("/dev/ttyUSB0", 0x10C4, 0xEA60);
    assert_eq!(s.tick(at(8_000)), TickOutcome::Disconnected);
    assert_eq!(s.tick(at(15_000)), TickOutcome::Sent);
    assert_eq!(bus.scans(), 5);
}

#[test]
fn send_without_session_is_not_connected() {
    let bus = Bus::default();
    let mut link = Link::new(None, 115_200, MockEnumerator(bus.clone()), MockOpener(bus.clone()));
    assert!(matches!(link.send(b"{}\n"), Err(LinkError::NotConnected)));
    assert!(matches!(link.connect(), Err(LinkError::DeviceNotFound)));
    bus.plug("/dev/ttyUSB0", 0x10C4, 0xEA60);
    assert!(link.connect().is_ok());
    link.disconnect();
    assert!(!link.is_connected());
}
