//! STATS screen: one labelled readout per line.

use embedded_graphics::{
    mono_font::ascii::FONT_8X13,
    pixelcolor::Rgb565,
    prelude::*,
};

use crate::types::Snapshot;
use crate::ui::status::draw_status;
use crate::ui::theme::{field_color, Field, BG, BRIGHT, DIM, TEXT};
use crate::ui::util::{fill_rect, pct, text, whole, Anchor};
use crate::ui::{SCREEN_H, SCREEN_W};

const TITLE_Y: i32 = 8;
const FIRST_LINE_Y: i32 = 50;
const LINE_STEP: i32 = 22;
const LABEL_X: i32 = 10;
const VALUE_X: i32 = 310;
// value column cleared before a per-field update
const VALUE_CLEAR_X: i32 = 80;
const STATUS_Y: i32 = SCREEN_H as i32 - 8;

const LABELS: [&str; 8] = ["CPU", "GPU", "PWR", "VRAM", "RAM", "SWAP", "DISK", "NET"];

fn readouts(s: &Snapshot) -> [(String, Rgb565); 8] {
    [
        (
            format!("{}% {}C", whole(s.cpu.load), whole(s.cpu.temp)),
            field_color(Field::CpuLoad, s.cpu.load),
        ),
        (
            format!("{}% {}C", whole(s.gpu.gpu_load), whole(s.gpu.gpu_temp)),
            field_color(Field::GpuLoad, s.gpu.gpu_load),
        ),
        (format!("{}W", whole(s.gpu.gpu_pwr)), TEXT),
        (
            format!(
                "{:.1}/{:.1}GB",
                s.gpu.vram_used / 1024.0,
                s.gpu.vram_total / 1024.0
            ),
            TEXT,
        ),
        (
            format!("{:.1}/{:.1}GB", s.ram.used, s.ram.total),
            field_color(Field::RamPercent, s.ram.p),
        ),
        (pct(s.swap.p), field_color(Field::SwapPercent, s.swap.p)),
        (pct(s.disk.p), field_color(Field::DiskPercent, s.disk.p)),
        (format!("{:.1}/{:.1}MB", s.net.sent, s.net.recv), TEXT),
    ]
}

/// Draw the STATS screen. With `full` the background, title and labels are
/// redrawn; otherwise only the value column and status are repainted.
pub fn draw_stats<D>(target: &mut D, s: &Snapshot, online: bool, full: bool) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    if full {
        target.clear(BG)?;
        text(
            target,
            "SYSTEM MONITOR",
            SCREEN_W as i32 / 2,
            TITLE_Y,
            Anchor::Center,
            &FONT_8X13,
            BRIGHT,
            Some(BG),
        )?;
        for (i, label) in LABELS.iter().enumerate() {
            let y = FIRST_LINE_Y + i as i32 * LINE_STEP;
            text(target, label, LABEL_X, y, Anchor::TopLeft, &FONT_8X13, DIM, Some(BG))?;
        }
    }

    for (i, (value, color)) in readouts(s).iter().enumerate() {
        let y = FIRST_LINE_Y + i as i32 * LINE_STEP;
        if !full {
            fill_rect(target, VALUE_CLEAR_X, y, (VALUE_X - VALUE_CLEAR_X + 1) as u32, 14, BG)?;
        }
        text(target, value, VALUE_X, y, Anchor::TopRight, &FONT_8X13, *color, Some(BG))?;
    }

    draw_status(target, online, STATUS_Y, &FONT_8X13, full)
}
