//! Device-side renderer for the serial telemetry dashboard.
//!
//! Consumes newline-delimited JSON snapshots from a byte source, keeps the
//! display state (screen, mode-changed flag, link freshness) and draws one of
//! two screens onto any `embedded-graphics` RGB565 target.

pub mod decode;
pub mod device;
pub mod input;
pub mod render;
pub mod state;
pub mod types;
pub mod ui;

pub use decode::{decode_record, DecodeError, LineReader, MAX_RECORD_BYTES};
pub use device::{Device, DeviceConfig, RedrawPolicy, TickReport};
pub use input::{Button, NoTouch, SerialRx, TouchInput, TouchPoint};
pub use render::{DrawStrategy, FrameBuffer, Redraw, Renderer};
pub use state::{DisplayState, InputZones, Screen};
pub use types::{Snapshot, MAX_CORES};
