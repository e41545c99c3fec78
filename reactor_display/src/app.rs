//! Emulator main loop: terminal setup, key/mouse input, device ticks and drawing.

use std::{
    io, thread,
    time::{Duration, Instant},
};

use anyhow::anyhow;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use embedded_graphics::prelude::Size;
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use reactor_display::{
    ui::{SCREEN_H, SCREEN_W},
    Device, DeviceConfig, FrameBuffer, SerialRx,
};

use crate::term::{cell_to_panel, ClickTouch, KeyButton, PanelView};

const LOOP_DELAY: Duration = Duration::from_millis(10);

type Emulated<S> = Device<FrameBuffer, S, KeyButton, ClickTouch>;

pub fn run<S: SerialRx>(serial: S, config: DeviceConfig) -> anyhow::Result<()> {
    let panel = FrameBuffer::try_new(Size::new(SCREEN_W, SCREEN_H))
        .ok_or_else(|| anyhow!("no memory for the emulated panel"))?;
    let mut device = Device::new(panel, serial, KeyButton::default(), ClickTouch::default(), config);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let res = event_loop(&mut terminal, &mut device);

    // Teardown
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn event_loop<B, S>(terminal: &mut Terminal<B>, device: &mut Emulated<S>) -> anyhow::Result<()>
where
    B: ratatui::backend::Backend,
    S: SerialRx,
{
    let started = Instant::now();
    let now_ms = || started.elapsed().as_millis() as u64;

    device.boot(now_ms())?;
    let mut dirty = true;

    loop {
        // Input (non-blocking)
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(k) if k.kind == KeyEventKind::Press => match k.code {
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char(' ') | KeyCode::Char('b') | KeyCode::Char('B') => {
                        device.button_mut().press();
                    }
                    _ => {}
                },
                Event::Mouse(m) if m.kind == MouseEventKind::Down(MouseButton::Left) => {
                    let sz = terminal.size()?;
                    let area = panel_area(Rect::new(0, 0, sz.width, sz.height));
                    let panel = Size::new(SCREEN_W, SCREEN_H);
                    if let Some((x, y)) = cell_to_panel(m.column, m.row, area, panel) {
                        device.touch_mut().click(x, y);
                    }
                }
                Event::Resize(_, _) => dirty = true,
                _ => {}
            }
        }

        let report = device.tick(now_ms())?;
        if report.redraw.is_some() || dirty {
            terminal.draw(|f| {
                let area = panel_area(f.area());
                f.render_widget(PanelView(device.panel()), area);
            })?;
            dirty = false;
        }

        thread::sleep(LOOP_DELAY);
    }
}

/// Largest centred area that keeps the panel's 4:3 shape, given half-block
/// cells (one column per pixel, two pixel rows per terminal row, cells about
/// twice as tall as wide).
pub fn panel_area(screen: Rect) -> Rect {
    let by_height = (screen.height as u32 * 2 * SCREEN_W / SCREEN_H) as u16;
    let width = screen.width.min(by_height);
    let height = ((width as u32 * SCREEN_H) / (SCREEN_W * 2)) as u16;
    let height = height.min(screen.height);
    Rect::new(
        screen.x + (screen.width - width) / 2,
        screen.y + (screen.height - height) / 2,
        width,
        height,
    )
}
