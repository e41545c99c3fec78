//! Serial link to the panel: port discovery, session lifetime and writes.

use std::io::{self, Write};
use std::time::Duration;

use serialport::{SerialPort, SerialPortType};
use tracing::{debug, info, warn};

use crate::error::LinkError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsbIdentity {
    pub vid: u16,
    pub pid: u16,
}

/// One serial port as the OS reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortCandidate {
    pub path: String,
    /// `None` for non-USB ports (built-in UARTs, Bluetooth, PCI).
    pub usb: Option<UsbIdentity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownBridge {
    pub vid: u16,
    /// `None` matches every product of the vendor.
    pub pid: Option<u16>,
    pub name: &'static str,
}

/// USB-to-serial bridges the panel controller ships with.
pub const KNOWN_BRIDGES: &[KnownBridge] = &[
    KnownBridge { vid: 0x10C4, pid: Some(0xEA60), name: "CP210x" },
    KnownBridge { vid: 0x1A86, pid: Some(0x7523), name: "CH340" },
    KnownBridge { vid: 0x303A, pid: None, name: "Espressif USB" },
];

pub fn bridge_for(id: UsbIdentity) -> Option<&'static KnownBridge> {
    KNOWN_BRIDGES
        .iter()
        .find(|b| b.vid == id.vid && b.pid.is_none_or(|pid| pid == id.pid))
}

/// First candidate (in OS order) behind a known bridge.
pub fn select_port(candidates: &[PortCandidate]) -> Result<(&PortCandidate, &'static KnownBridge), LinkError> {
    candidates
        .iter()
        .find_map(|c| c.usb.and_then(bridge_for).map(|b| (c, b)))
        .ok_or(LinkError::DeviceNotFound)
}

pub trait PortEnumerator {
    fn candidates(&mut self) -> Result<Vec<PortCandidate>, LinkError>;
}

pub trait PortOpener {
    fn open(&mut self, path: &str, baud: u32) -> Result<Box<dyn Write>, LinkError>;
}

/// The OS serial port list.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPorts;

impl PortEnumerator for SystemPorts {
    fn candidates(&mut self) -> Result<Vec<PortCandidate>, LinkError> {
        let ports = serialport::available_ports().map_err(LinkError::Enumerate)?;
        Ok(ports
            .into_iter()
            .map(|p| PortCandidate {
                usb: match p.port_type {
                    SerialPortType::UsbPort(info) => Some(UsbIdentity {
                        vid: info.vid,
                        pid: info.pid,
                    }),
                    _ => None,
                },
                path: p.port_name,
            })
            .collect())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SerialOpener {
    pub timeout: Duration,
}

impl Default for SerialOpener {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(1),
        }
    }
}

struct PortWriter(Box<dyn SerialPort>);

impl Write for PortWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl PortOpener for SerialOpener {
    fn open(&mut self, path: &str, baud: u32) -> Result<Box<dyn Write>, LinkError> {
        let port = serialport::new(path, baud)
            .timeout(self.timeout)
            .open()
            .map_err(|source| LinkError::Open {
                path: path.to_string(),
                source,
            })?;
        Ok(Box::new(PortWriter(port)))
    }
}

/// An open port. Dropped on the first failed write.
pub struct LinkSession {
    path: String,
    identity: Option<UsbIdentity>,
    writer: Box<dyn Write>,
}

impl LinkSession {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// `None` when the path was given explicitly.
    pub fn identity(&self) -> Option<UsbIdentity> {
        self.identity
    }

    fn write_record(&mut self, record: &[u8]) -> io::Result<()> {
        self.writer.write_all(record)?;
        self.writer.flush()
    }
}

/// Owns at most one session and knows how to make the next one.
pub struct Link<E, O> {
    explicit: Option<String>,
    baud: u32,
    enumerator: E,
    opener: O,
    session: Option<LinkSession>,
    outage_logged: bool,
}

impl<E: PortEnumerator, O: PortOpener> Link<E, O> {
    /// `explicit` skips discovery; that path is opened as-is.
    pub fn new(explicit: Option<String>, baud: u32, enumerator: E, opener: O) -> Self {
        Self {
            explicit,
            baud,
            enumerator,
            opener,
            session: None,
            outage_logged: false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&LinkSession> {
        self.session.as_ref()
    }

    /// Discover (unless explicit) and open. A failure is logged at warn for
    /// the first attempt of an outage and at debug after that.
    pub fn connect(&mut self) -> Result<&LinkSession, LinkError> {
        match self.open_session() {
            Ok(session) => {
                info!(
                    port = %session.path,
                    baud = self.baud,
                    usb = ?session.identity,
                    "link up"
                );
                self.outage_logged = false;
                Ok(self.session.insert(session))
            }
            Err(e) => {
                if self.outage_logged {
                    debug!("link still down: {e}");
                } else {
                    warn!("link down: {e}; retrying");
                    self.outage_logged = true;
                }
                Err(e)
            }
        }
    }

    fn open_session(&mut self) -> Result<LinkSession, LinkError> {
        let (path, identity) = match &self.explicit {
            Some(path) => (path.clone(), None),
            None => {
                let candidates = self.enumerator.candidates()?;
                let (port, bridge) = select_port(&candidates)?;
                debug!(port = %port.path, bridge = bridge.name, "matched known bridge");
                (port.path.clone(), port.usb)
            }
        };
        let writer = self.opener.open(&path, self.baud)?;
        Ok(LinkSession { path, identity, writer })
    }

    /// Write one record. On failure the session is torn down.
    pub fn send(&mut self, record: &[u8]) -> Result<(), LinkError> {
        let session = self.session.as_mut().ok_or(LinkError::NotConnected)?;
        if let Err(source) = session.write_record(record) {
            let path = session.path.clone();
            self.session = None;
            warn!(port = %path, "write failed: {source}; closing link");
            return Err(LinkError::Write { path, source });
        }
        Ok(())
    }

    pub fn disconnect(&mut self) {
        if let Some(s) = self.session.take() {
            info!(port = %s.path, "link closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usb(path: &str, vid: u16, pid: u16) -> PortCandidate {
        PortCandidate {
            path: path.into(),
            usb: Some(UsbIdentity { vid, pid }),
        }
    }

    #[test]
    fn known_bridges_match() {
        assert_eq!(bridge_for(UsbIdentity { vid: 0x10C4, pid: 0xEA60 }).map(|b| b.name), Some("CP210x"));
        assert_eq!(bridge_for(UsbIdentity { vid: 0x1A86, pid: 0x7523 }).map(|b| b.name), Some("CH340"));
        assert!(bridge_for(UsbIdentity { vid: 0x303A, pid: 0x1001 }).is_some());
        assert!(bridge_for(UsbIdentity { vid: 0x303A, pid: 0x0002 }).is_some());
        // right vendor, wrong product
        assert!(bridge_for(UsbIdentity { vid: 0x10C4, pid: 0x0001 }).is_none());
        assert!(bridge_for(UsbIdentity { vid: 0x0403, pid: 0x6001 }).is_none());
    }

    #[test]
    fn first_match_wins_and_non_usb_is_skipped() {
        let ports = vec![
            PortCandidate { path: "/dev/ttyS0".into(), usb: None },
            usb("/dev/ttyUSB0", 0x0403, 0x6001),
            usb("/dev/ttyUSB1", 0x1A86, 0x7523),
            usb("/dev/ttyACM0", 0x303A, 0x1001),
        ];
        let (port, bridge) = select_port(&ports).unwrap();
        assert_eq!(port.path, "/dev/ttyUSB1");
        assert_eq!(bridge.name, "CH340");
    }

    #[test]
    fn nothing_matching_is_device_not_found() {
        let ports = vec![usb("/dev/ttyUSB0", 0x0403, 0x6001)];
        assert!(matches!(select_port(&ports), Err(LinkError::DeviceNotFound)));
        assert!(matches!(select_port(&[]), Err(LinkError::DeviceNotFound)));
    }
}
