//! UI module root: screen drawing functions for the panel.

pub mod reactor;
pub mod splash;
pub mod stats;
pub mod status;
pub mod theme;
pub mod util;

use embedded_graphics::{pixelcolor::Rgb565, prelude::*};

use crate::state::Screen;
use crate::types::Snapshot;

/// Panel resolution in landscape orientation.
pub const SCREEN_W: u32 = 320;
pub const SCREEN_H: u32 = 240;

/// Everything a frame depends on.
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    pub screen: Screen,
    pub snapshot: &'a Snapshot,
    pub online: bool,
}

/// Draw `view`. `full` redoes background and static chrome; otherwise only
/// the dynamic fields are repainted in place.
pub fn draw_screen<D>(target: &mut D, view: View<'_>, full: bool) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    match view.screen {
        Screen::Stats => stats::draw_stats(target, view.snapshot, view.online, full),
        Screen::Reactor => reactor::draw_reactor(target, view.snapshot, view.online, full),
    }
}
