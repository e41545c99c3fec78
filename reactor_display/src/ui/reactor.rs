//! REACTOR screen: 4x4 per-core heat grid, GPU/VRAM/RAM/SWAP gauges and a
//! one-line CPU/GPU footer.

use embedded_graphics::{
    mono_font::ascii::{FONT_6X10, FONT_8X13},
    pixelcolor::Rgb565,
    prelude::*,
};

use crate::types::{Snapshot, MAX_CORES};
use crate::ui::status::draw_status;
use crate::ui::theme::{heat_color, BG, BRIGHT, DIM, TEXT};
use crate::ui::util::{fill_rect, outline_rect, pct, text, whole, Anchor};
use crate::ui::{SCREEN_H, SCREEN_W};

pub const GRID_COLS: usize = 4;
const CELL: i32 = 35;
const GAP: i32 = 5;
const GRID_X: i32 = 40;
const GRID_Y: i32 = 30;
const TITLE_Y: i32 = 7;

const GAUGE_X: i32 = 220;
const GAUGE_W: i32 = 90;

const FOOTER_Y: i32 = GRID_Y + GRID_COLS as i32 * (CELL + GAP) + 5;
const STATUS_Y: i32 = SCREEN_H as i32 - 5;

/// Top-left corner of cell `idx` in the grid.
pub fn cell_origin(idx: usize) -> Point {
    let row = (idx / GRID_COLS) as i32;
    let col = (idx % GRID_COLS) as i32;
    Point::new(GRID_X + col * (CELL + GAP), GRID_Y + row * (CELL + GAP))
}

/// Load shown in cell `idx`; cores the host did not report read as idle.
pub fn core_load(s: &Snapshot, idx: usize) -> f32 {
    s.cpu.cores.get(idx).copied().unwrap_or(0.0)
}

pub fn draw_reactor<D>(target: &mut D, s: &Snapshot, online: bool, full: bool) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    if full {
        target.clear(BG)?;
        text(
            target,
            "REACTOR CORE 4",
            SCREEN_W as i32 / 2,
            TITLE_Y,
            Anchor::Center,
            &FONT_8X13,
            BRIGHT,
            Some(BG),
        )?;
    }

    for idx in 0..MAX_CORES {
        draw_cell(target, idx, core_load(s, idx))?;
    }

    let gauges = [
        ("GPU", s.gpu.gpu_load),
        ("VRAM", s.gpu.vram_percent()),
        ("RAM", s.ram.p),
        ("SWAP", s.swap.p),
    ];
    for (i, (label, value)) in gauges.iter().enumerate() {
        draw_gauge(target, GRID_Y + i as i32 * (CELL + GAP), label, *value)?;
    }

    draw_footer(target, s, full)?;
    draw_status(target, online, STATUS_Y, &FONT_6X10, full)
}

fn draw_cell<D>(target: &mut D, idx: usize, load: f32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let origin = cell_origin(idx);
    let color = heat_color(load);
    fill_rect(target, origin.x, origin.y, CELL as u32, CELL as u32, color)?;
    outline_rect(target, origin.x, origin.y, CELL as u32, CELL as u32, BG)?;
    let cx = origin.x + CELL / 2;
    let cy = origin.y + CELL / 2;
    text(target, &idx.to_string(), cx, cy - 5, Anchor::Center, &FONT_8X13, BG, Some(color))?;
    text(target, &pct(load), cx, cy + 9, Anchor::Center, &FONT_6X10, BG, Some(color))
}

fn draw_gauge<D>(target: &mut D, y: i32, label: &str, value: f32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let color = heat_color(value);
    fill_rect(target, GAUGE_X, y, GAUGE_W as u32, CELL as u32, color)?;
    outline_rect(target, GAUGE_X, y, GAUGE_W as u32, CELL as u32, BG)?;
    let cx = GAUGE_X + GAUGE_W / 2;
    text(target, label, cx, y + 10, Anchor::Center, &FONT_8X13, BG, None)?;
    text(target, &pct(value), cx, y + 25, Anchor::Center, &FONT_6X10, BG, None)
}

fn draw_footer<D>(target: &mut D, s: &Snapshot, full: bool) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    if !full {
        fill_rect(target, 0, FOOTER_Y, SCREEN_W, 11, BG)?;
    }
    let items: [(i32, String, Rgb565); 10] = [
        (5, "CPU".into(), DIM),
        (27, format!("{}C", whole(s.cpu.temp)), TEXT),
        (52, format!("{}W", whole(s.cpu.pwr)), TEXT),
        (79, format!("{}r", whole(s.cpu.fan)), DIM),
        (130, "GPU".into(), DIM),
        (152, format!("{}C", whole(s.gpu.gpu_temp)), TEXT),
        (177, format!("{}W", whole(s.gpu.gpu_pwr)), TEXT),
        (207, format!("{}%", whole(s.gpu.gpu_fan)), DIM),
        (250, format!("{}M", whole(s.cpu.freq)), DIM),
        (290, pct(s.disk.p), DIM),
    ];
    for (x, value, color) in items.iter() {
        text(target, value, *x, FOOTER_Y, Anchor::TopLeft, &FONT_6X10, *color, Some(BG))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_row_major() {
        assert_eq!(cell_origin(0), Point::new(40, 30));
        assert_eq!(cell_origin(3), Point::new(160, 30));
        assert_eq!(cell_origin(4), Point::new(40, 70));
        assert_eq!(cell_origin(15), Point::new(160, 150));
    }

    #[test]
    fn unreported_cores_read_idle() {
        let mut s = Snapshot::default();
        s.cpu.cores = vec![50.0, 75.0];
        assert_eq!(core_load(&s, 1), 75.0);
        assert_eq!(core_load(&s, 2), 0.0);
    }
}
