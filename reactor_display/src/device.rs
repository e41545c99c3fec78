//! Device main loop: poll input, poll serial, check staleness, maybe redraw.
//!
//! Everything here is driven by `tick(now_ms)`; the caller owns the clock and
//! the inter-iteration delay. Nothing blocks.

use embedded_graphics::{pixelcolor::Rgb565, prelude::*};
use tracing::{debug, info};

use crate::decode::{LineReader, MAX_RECORD_BYTES};
use crate::input::{Button, ButtonEdge, InputEvent, SerialRx, TouchInput};
use crate::render::{DrawStrategy, Redraw, Renderer};
use crate::state::{DisplayState, InputZones, Screen};
use crate::types::Snapshot;
use crate::ui::View;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedrawPolicy {
    /// Redraw on new data or mode change, and at least every `interval_ms`.
    KeepAlive { interval_ms: u64 },
    /// Redraw on every loop iteration.
    EveryIteration,
}

#[derive(Debug, Clone, Copy)]
pub struct DeviceConfig {
    pub stale_timeout_ms: u64,
    pub splash_ms: u64,
    pub touch_threshold: u16,
    pub zones: InputZones,
    pub redraw: RedrawPolicy,
    pub strategy: DrawStrategy,
    pub initial_screen: Screen,
    /// Upper bound on bytes consumed from serial per tick.
    pub max_bytes_per_tick: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            stale_timeout_ms: 3_000,
            splash_ms: 1_500,
            touch_threshold: 600,
            zones: InputZones::default(),
            redraw: RedrawPolicy::KeepAlive { interval_ms: 200 },
            strategy: DrawStrategy::Buffered,
            initial_screen: Screen::Reactor,
            max_bytes_per_tick: MAX_RECORD_BYTES * 2,
        }
    }
}

/// What one tick did; mostly for tests and trace logging.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub decoded: usize,
    pub dropped: usize,
    pub screen_changed: bool,
    pub went_offline: bool,
    pub redraw: Option<Redraw>,
}

pub struct Device<P, S, B, T> {
    panel: P,
    serial: S,
    button: B,
    touch: T,
    button_edge: ButtonEdge,
    lines: LineReader,
    state: DisplayState,
    snapshot: Snapshot,
    renderer: Renderer,
    config: DeviceConfig,
    splash_until: Option<u64>,
    last_draw_ms: Option<u64>,
}

impl<P, S, B, T> Device<P, S, B, T>
where
    P: DrawTarget<Color = Rgb565> + OriginDimensions,
    S: SerialRx,
    B: Button,
    T: TouchInput,
{
    pub fn new(panel: P, serial: S, button: B, touch: T, config: DeviceConfig) -> Self {
        let renderer = Renderer::new(config.strategy, panel.size());
        Self {
            panel,
            serial,
            button,
            touch,
            button_edge: ButtonEdge::default(),
            lines: LineReader::new(),
            state: DisplayState::new(config.initial_screen),
            snapshot: Snapshot::default(),
            renderer,
            config,
            splash_until: None,
            last_draw_ms: None,
        }
    }

    /// Show the boot splash; dashboard frames start `splash_ms` later.
    pub fn boot(&mut self, now_ms: u64) -> Result<(), P::Error> {
        self.renderer.draw_splash(&mut self.panel)?;
        self.splash_until = Some(now_ms.saturating_add(self.config.splash_ms));
        info!(strategy = ?self.renderer.strategy(), "display booted");
        Ok(())
    }

    pub fn tick(&mut self, now_ms: u64) -> Result<TickReport, P::Error> {
        let mut report = TickReport {
            screen_changed: self.poll_input(now_ms),
            ..TickReport::default()
        };
        let (decoded, dropped) = self.poll_serial(now_ms);
        report.decoded = decoded;
        report.dropped = dropped;
        report.went_offline = self
            .state
            .check_staleness(now_ms, self.config.stale_timeout_ms);
        if report.went_offline {
            info!("no telemetry for {} ms; offline", self.config.stale_timeout_ms);
        }

        if self.splash_until.is_some_and(|until| now_ms < until) {
            return Ok(report);
        }

        let due = match self.config.redraw {
            RedrawPolicy::EveryIteration => true,
            RedrawPolicy::KeepAlive { interval_ms } => {
                decoded > 0
                    || report.went_offline
                    || self.state.mode_changed()
                    || self
                        .last_draw_ms
                        .is_none_or(|t| now_ms.saturating_sub(t) > interval_ms)
            }
        };
        if due {
            report.redraw = Some(self.redraw(now_ms)?);
        }
        Ok(report)
    }

    fn poll_input(&mut self, now_ms: u64) -> bool {
        let mut changed = false;
        if self.button_edge.update(self.button.is_pressed()) {
            changed |= self
                .state
                .apply(InputEvent::ButtonPressed, now_ms, &self.config.zones);
        }
        if let Some(p) = self.touch.read() {
            if p.pressure >= self.config.touch_threshold {
                changed |= self
                    .state
                    .apply(InputEvent::Touch { x: p.x }, now_ms, &self.config.zones);
            }
        }
        if changed {
            debug!(screen = ?self.state.screen(), "screen changed");
        }
        changed
    }

    fn poll_serial(&mut self, now_ms: u64) -> (usize, usize) {
        let (mut decoded, mut dropped) = (0, 0);
        for _ in 0..self.config.max_bytes_per_tick {
            let Some(byte) = self.serial.poll_byte() else {
                break;
            };
            match self.lines.feed(byte) {
                Some(Ok(snapshot)) => {
                    self.snapshot = snapshot;
                    self.state.record_snapshot(now_ms);
                    decoded += 1;
                }
                Some(Err(e)) => {
                    debug!("dropping record: {e}");
                    dropped += 1;
                }
                None => {}
            }
        }
        (decoded, dropped)
    }

    fn redraw(&mut self, now_ms: u64) -> Result<Redraw, P::Error> {
        let view = View {
            screen: self.state.screen(),
            snapshot: &self.snapshot,
            online: self.state.online(),
        };
        let redraw = self
            .renderer
            .draw(&mut self.panel, view, self.state.mode_changed())?;
        self.state.clear_mode_changed();
        self.last_draw_ms = Some(now_ms);
        Ok(redraw)
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn strategy(&self) -> DrawStrategy {
        self.renderer.strategy()
    }

    pub fn serial_mut(&mut self) -> &mut S {
        &mut self.serial
    }

    pub fn button_mut(&mut self) -> &mut B {
        &mut self.button
    }

    pub fn touch_mut(&mut self) -> &mut T {
        &mut self.touch
    }
}
