//! Types that mirror the agent's line-delimited JSON schema.
//!
//! Every field defaults to zero, so a record missing a whole subtree (no GPU
//! on the host, an older agent) still decodes into something renderable.
//! Unknown keys are ignored and `null` values read as zero.

use serde::{Deserialize, Deserializer};

/// Per-core loads beyond this count are dropped during decode.
pub const MAX_CORES: usize = 16;

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Cpu {
    #[serde(deserialize_with = "null_as_default")]
    pub load: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub temp: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub freq: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub pwr: f32,
    // RPM; absent when the host has no readable fan sensor
    #[serde(deserialize_with = "null_as_default")]
    pub fan: f32,
    #[serde(deserialize_with = "capped_cores")]
    pub cores: Vec<f32>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Ram {
    // GiB
    #[serde(deserialize_with = "null_as_default")]
    pub used: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub total: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub p: f32,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Swap {
    // GiB
    #[serde(deserialize_with = "null_as_default")]
    pub used: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub total: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub p: f32,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Gpu {
    #[serde(deserialize_with = "null_as_default")]
    pub gpu_load: f32,
    // MiB
    #[serde(deserialize_with = "null_as_default")]
    pub vram_used: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub vram_total: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub vram_p: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub gpu_temp: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub gpu_pwr: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub gpu_fan: f32,
}

impl Gpu {
    /// VRAM usage derived from used/total; zero when the total is unknown.
    pub fn vram_percent(&self) -> f32 {
        if self.vram_total > 0.0 {
            self.vram_used / self.vram_total * 100.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Disk {
    #[serde(deserialize_with = "null_as_default")]
    pub p: f32,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Net {
    // cumulative MiB since host boot, shown as given
    #[serde(deserialize_with = "null_as_default")]
    pub sent: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub recv: f32,
}

/// One decoded telemetry record. Replaced wholesale on every successful decode.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Snapshot {
    #[serde(deserialize_with = "null_as_default")]
    pub cpu: Cpu,
    #[serde(deserialize_with = "null_as_default")]
    pub ram: Ram,
    #[serde(deserialize_with = "null_as_default")]
    pub swap: Swap,
    #[serde(deserialize_with = "null_as_default")]
    pub gpu: Gpu,
    #[serde(deserialize_with = "null_as_default")]
    pub disk: Disk,
    #[serde(deserialize_with = "null_as_default")]
    pub net: Net,
}

fn capped_cores<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<f32>, D::Error> {
    let mut cores: Vec<f32> = null_as_default(d)?;
    cores.truncate(MAX_CORES);
    Ok(cores)
}

/// `null` reads as the field's default, the same as a missing key.
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_gpu_subtree_is_all_zero() {
        let s: Snapshot = serde_json::from_str(r#"{"cpu":{"load":12.5}}"#).unwrap();
        assert_eq!(s.gpu, Gpu::default());
        assert_eq!(s.gpu.vram_percent(), 0.0);
        assert_eq!(s.cpu.load, 12.5);
    }

    #[test]
    fn extra_cores_are_truncated() {
        let cores: Vec<String> = (0..24).map(|i| i.to_string()).collect();
        let line = format!(r#"{{"cpu":{{"cores":[{}]}}}}"#, cores.join(","));
        let s: Snapshot = serde_json::from_str(&line).unwrap();
        assert_eq!(s.cpu.cores.len(), MAX_CORES);
        assert_eq!(s.cpu.cores[15], 15.0);
    }

    #[test]
    fn unknown_fields_and_integer_spellings_accepted() {
        let s: Snapshot = serde_json::from_str(
            r#"{"cpu":{"freq":3400,"future":"x"},"gpu":{"gpu_load":55,"gpu_fan":null},"os":"linux"}"#,
        )
        .unwrap();
        assert_eq!(s.cpu.freq, 3400.0);
        assert_eq!(s.gpu.gpu_load, 55.0);
        assert_eq!(s.gpu.gpu_fan, 0.0);
    }

    #[test]
    fn null_values_read_as_zero() {
        let s: Snapshot =
            serde_json::from_str(r#"{"cpu":{"load":null,"cores":null,"temp":61},"gpu":null,"net":{"sent":null}}"#)
                .unwrap();
        assert_eq!(s.cpu.load, 0.0);
        assert!(s.cpu.cores.is_empty());
        assert_eq!(s.cpu.temp, 61.0);
        assert_eq!(s.gpu, Gpu::default());
        assert_eq!(s.net.sent, 0.0);
    }

    #[test]
    fn wrong_types_still_fail() {
        assert!(serde_json::from_str::<Snapshot>(r#"{"cpu":{"load":"high"}}"#).is_err());
        assert!(serde_json::from_str::<Snapshot>(r#"{"gpu":"none"}"#).is_err());
    }
}
