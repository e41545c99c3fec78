//! Terminal stand-ins for the panel hardware: frame widget, serial port
//! source, keyboard button and mouse touch.

use std::collections::VecDeque;
use std::io::{self, Read};
use std::time::Duration;

use embedded_graphics::{pixelcolor::Rgb565, prelude::*};
use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};
use reactor_display::ui::theme::BG;
use reactor_display::{Button, FrameBuffer, SerialRx, TouchInput, TouchPoint};
use tracing::warn;

/// Renders a frame into the terminal with half-block cells (two panel rows
/// per terminal row), nearest-neighbour scaled to the widget area.
pub struct PanelView<'a>(pub &'a FrameBuffer);

fn to_tui(c: Rgb565) -> Color {
    Color::Rgb(
        (c.r() << 3) | (c.r() >> 2),
        (c.g() << 2) | (c.g() >> 4),
        (c.b() << 3) | (c.b() >> 2),
    )
}

impl Widget for PanelView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let size = self.0.size();
        let rows = area.height as u32 * 2;
        for cy in 0..area.height {
            for cx in 0..area.width {
                let px = cx as u32 * size.width / area.width as u32;
                let top = (cy as u32 * 2) * size.height / rows;
                let bottom = (cy as u32 * 2 + 1) * size.height / rows;
                let fg = self.0.pixel(Point::new(px as i32, top as i32)).unwrap_or(BG);
                let bg = self.0.pixel(Point::new(px as i32, bottom as i32)).unwrap_or(BG);
                buf[(area.x + cx, area.y + cy)]
                    .set_symbol("▀")
                    .set_fg(to_tui(fg))
                    .set_bg(to_tui(bg));
            }
        }
    }
}

/// Map a terminal cell back to panel coordinates.
pub fn cell_to_panel(column: u16, row: u16, area: Rect, panel: Size) -> Option<(u16, u16)> {
    if area.width == 0 || area.height == 0 {
        return None;
    }
    if column < area.x || row < area.y || column >= area.x + area.width || row >= area.y + area.height {
        return None;
    }
    let x = (column - area.x) as u32 * panel.width / area.width as u32;
    let y = (row - area.y) as u32 * panel.height / area.height as u32;
    Some((x as u16, y as u16))
}

/// Non-blocking reader over a host serial port.
pub struct PortRx {
    port: Box<dyn serialport::SerialPort>,
    pending: VecDeque<u8>,
    chunk: [u8; 256],
    failing: bool,
}

impl PortRx {
    pub fn open(path: &str, baud: u32) -> Result<Self, serialport::Error> {
        let port = serialport::new(path, baud)
            .timeout(Duration::from_millis(10))
            .open()?;
        Ok(Self {
            port,
            pending: VecDeque::new(),
            chunk: [0; 256],
            failing: false,
        })
    }

    fn fill(&mut self) {
        let available = match self.port.bytes_to_read() {
            Ok(n) => n as usize,
            Err(e) => {
                self.report(&io::Error::from(e));
                return;
            }
        };
        if available == 0 {
            return;
        }
        let want = available.min(self.chunk.len());
        match self.port.read(&mut self.chunk[..want]) {
            Ok(n) => {
                self.pending.extend(&self.chunk[..n]);
                self.failing = false;
            }
            Err(e) if e.kind() == io::ErrorKind::TimedOut => {}
            Err(e) => self.report(&e),
        }
    }

    fn report(&mut self, e: &io::Error) {
        if !self.failing {
            warn!("serial read failed: {e}");
            self.failing = true;
        }
    }
}

impl SerialRx for PortRx {
    fn poll_byte(&mut self) -> Option<u8> {
        if self.pending.is_empty() {
            self.fill();
        }
        self.pending.pop_front()
    }
}

/// Key press latched until the next poll, so every press shows up as one
/// pressed sample followed by a released one.
#[derive(Debug, Default)]
pub struct KeyButton {
    latched: bool,
}

impl KeyButton {
    pub fn press(&mut self) {
        self.latched = true;
    }
}

impl Button for KeyButton {
    fn is_pressed(&mut self) -> bool {
        std::mem::take(&mut self.latched)
    }
}

/// Mouse click reported once as a firm touch.
#[derive(Debug, Default)]
pub struct ClickTouch {
    pending: Option<TouchPoint>,
}

impl ClickTouch {
    pub const PRESSURE: u16 = 1_000;

    pub fn click(&mut self, x: u16, y: u16) {
        self.pending = Some(TouchPoint {
            x,
            y,
            pressure: Self::PRESSURE,
        });
    }
}

impl TouchInput for ClickTouch {
    fn read(&mut self) -> Option<TouchPoint> {
        self.pending.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_map_back_to_panel_pixels() {
        let area = Rect::new(0, 0, 160, 60);
        let panel = Size::new(320, 240);
        assert_eq!(cell_to_panel(0, 0, area, panel), Some((0, 0)));
        assert_eq!(cell_to_panel(25, 30, area, panel), Some((50, 120)));
        assert_eq!(cell_to_panel(125, 59, area, panel), Some((250, 236)));
        assert_eq!(cell_to_panel(160, 0, area, panel), None);
    }

    #[test]
    fn key_button_reads_pressed_once() {
        let mut b = KeyButton::default();
        b.press();
        assert!(b.is_pressed());
        assert!(!b.is_pressed());
    }

    #[test]
    fn rgb565_expands_to_full_range() {
        assert_eq!(to_tui(Rgb565::new(31, 63, 31)), Color::Rgb(255, 255, 255));
        assert_eq!(to_tui(Rgb565::new(0, 0, 0)), Color::Rgb(0, 0, 0));
    }

    #[test]
    fn half_block_cells_carry_two_panel_rows() {
        let mut fb = FrameBuffer::try_new(Size::new(4, 4)).unwrap();
        let hot = Rgb565::new(31, 0, 0);
        fb.draw_iter([Pixel(Point::new(0, 1), hot)]).unwrap();

        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        PanelView(&fb).render(area, &mut buf);
        let cell = &buf[(0, 0)];
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, to_tui(BG));
        assert_eq!(cell.bg, to_tui(hot));
        assert_eq!(buf[(1, 1)].bg, to_tui(BG));
    }
}
