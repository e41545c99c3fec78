//! Record framing for the serial link.

use crate::error::LinkError;
use crate::types::Snapshot;

/// Largest record (terminator included) the panel's line buffer accepts.
pub const MAX_RECORD_BYTES: usize = 1536;

/// Encode one snapshot as a `\n`-terminated JSON line.
pub fn encode_record(snapshot: &Snapshot) -> Result<Vec<u8>, LinkError> {
    let mut buf = serde_json::to_vec(snapshot)?;
    buf.push(b'\n');
    if buf.len() > MAX_RECORD_BYTES {
        return Err(LinkError::RecordTooLarge {
            len: buf.len(),
            limit: MAX_RECORD_BYTES,
        });
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cpu, MAX_CORES};

    #[test]
    fn record_is_one_terminated_line() {
        let rec = encode_record(&Snapshot::default()).unwrap();
        assert_eq!(rec.last(), Some(&b'\n'));
        assert_eq!(rec.iter().filter(|b| **b == b'\n').count(), 1);
        let v: serde_json::Value = serde_json::from_slice(&rec).unwrap();
        for key in ["cpu", "ram", "swap", "gpu", "disk", "net"] {
            assert!(v.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn worst_case_normalized_record_fits() {
        let s = Snapshot {
            cpu: Cpu {
                load: 100.0,
                temp: 105.5,
                freq: 5_800.0,
                pwr: 253.4,
                fan: Some(u32::MAX),
                cores: vec![100.0; 64],
            },
            ..Snapshot::default()
        }
        .normalized();
        assert_eq!(s.cpu.cores.len(), MAX_CORES);
        assert!(encode_record(&s).unwrap().len() < MAX_RECORD_BYTES);
    }

    #[test]
    fn oversized_record_is_refused() {
        let s = Snapshot {
            cpu: Cpu {
                cores: vec![123.456_78; 400],
                ..Cpu::default()
            },
            ..Snapshot::default()
        };
        match encode_record(&s) {
            Err(LinkError::RecordTooLarge { len, limit }) => {
                assert!(len > limit);
                assert_eq!(limit, MAX_RECORD_BYTES);
            }
            other => panic!("expected RecordTooLarge, got {other:?}"),
        }
    }
}
