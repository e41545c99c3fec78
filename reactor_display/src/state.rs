//! Display state: selected screen, mode-changed flag and link freshness.

use crate::input::InputEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Tabular numeric readout.
    Stats,
    /// 4x4 core heat grid plus side gauges.
    Reactor,
}

impl Screen {
    pub fn toggled(self) -> Self {
        match self {
            Screen::Stats => Screen::Reactor,
            Screen::Reactor => Screen::Stats,
        }
    }
}

/// Thresholds for turning raw input into screen transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputZones {
    /// Touches left of this x select `Stats`.
    pub left_zone: u16,
    /// Touches right of this x select `Reactor`.
    pub right_zone: u16,
    /// Transitions closer together than this are ignored.
    pub quiet_ms: u64,
}

impl Default for InputZones {
    fn default() -> Self {
        Self {
            left_zone: 80,
            right_zone: 240,
            quiet_ms: 300,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DisplayState {
    screen: Screen,
    mode_changed: bool,
    last_data_ms: Option<u64>,
    online: bool,
    last_transition_ms: Option<u64>,
}

impl DisplayState {
    pub fn new(initial: Screen) -> Self {
        Self {
            screen: initial,
            // first frame always draws chrome
            mode_changed: true,
            last_data_ms: None,
            online: false,
            last_transition_ms: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn online(&self) -> bool {
        self.online
    }

    pub fn mode_changed(&self) -> bool {
        self.mode_changed
    }

    pub fn last_data_ms(&self) -> Option<u64> {
        self.last_data_ms
    }

    /// Called after a frame with chrome has been drawn.
    pub fn clear_mode_changed(&mut self) {
        self.mode_changed = false;
    }

    /// A record decoded successfully at `now_ms`.
    pub fn record_snapshot(&mut self, now_ms: u64) {
        self.last_data_ms = Some(now_ms);
        self.online = true;
    }

    /// Flip to offline once more than `timeout_ms` passed without data.
    /// Returns true only on the online -> offline transition.
    pub fn check_staleness(&mut self, now_ms: u64, timeout_ms: u64) -> bool {
        let stale = self
            .last_data_ms
            .is_none_or(|t| now_ms.saturating_sub(t) > timeout_ms);
        if stale && self.online {
            self.online = false;
            return true;
        }
        false
    }

    /// Apply one input event. Returns true when the screen changed.
    pub fn apply(&mut self, event: InputEvent, now_ms: u64, zones: &InputZones) -> bool {
        if let Some(t) = self.last_transition_ms {
            if now_ms.saturating_sub(t) < zones.quiet_ms {
                return false;
            }
        }
        let target = match event {
            InputEvent::ButtonPressed => Some(self.screen.toggled()),
            InputEvent::Touch { x } if x < zones.left_zone => Some(Screen::Stats),
            InputEvent::Touch { x } if x > zones.right_zone => Some(Screen::Reactor),
            InputEvent::Touch { .. } => None,
        };
        match target {
            Some(next) if next != self.screen => {
                self.screen = next;
                self.mode_changed = true;
                self.last_transition_ms = Some(now_ms);
                true
            }
            _ => false,
        }
    }
}
