//! Panel palette and the two threshold tables.
//!
//! The heat tiers color grid cells and gauges by load band; the field
//! warnings flip a single readout between normal and warning text. They are
//! kept as separate tables on purpose and must not be folded together.

use embedded_graphics::pixelcolor::Rgb565;

pub const BG: Rgb565 = Rgb565::new(0, 0, 0); // 0x0000
pub const TEXT: Rgb565 = Rgb565::new(31, 0, 0); // 0xF800
pub const DIM: Rgb565 = Rgb565::new(17, 0, 0); // 0x8800
pub const BRIGHT: Rgb565 = Rgb565::new(31, 45, 0); // 0xFDA0
pub const WARN: Rgb565 = Rgb565::new(31, 63, 0); // 0xFFE0
pub const COOL: Rgb565 = Rgb565::new(4, 8, 4); // 0x2104

/// (exclusive upper bound, color), checked top-down; anything past the last
/// bound renders in [`WARN`].
pub const HEAT_TIERS: [(f32, Rgb565); 4] = [(20.0, COOL), (40.0, DIM), (60.0, TEXT), (80.0, BRIGHT)];

pub fn heat_color(load: f32) -> Rgb565 {
    HEAT_TIERS
        .iter()
        .find(|(bound, _)| load < *bound)
        .map(|(_, color)| *color)
        .unwrap_or(WARN)
}

/// Readouts with their own warning threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    CpuLoad,
    GpuLoad,
    RamPercent,
    SwapPercent,
    DiskPercent,
}

/// Values strictly above the threshold switch to warning text.
pub const FIELD_WARNINGS: [(Field, f32); 5] = [
    (Field::CpuLoad, 80.0),
    (Field::GpuLoad, 80.0),
    (Field::RamPercent, 85.0),
    (Field::SwapPercent, 50.0),
    (Field::DiskPercent, 90.0),
];

pub fn field_color(field: Field, value: f32) -> Rgb565 {
    let threshold = FIELD_WARNINGS
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, t)| *t)
        .unwrap_or(f32::INFINITY);
    if value > threshold {
        WARN
    } else {
        TEXT
    }
}

pub fn status_color(online: bool) -> Rgb565 {
    if online {
        TEXT
    } else {
        WARN
    }
}
