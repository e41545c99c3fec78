//! ONLINE/OFFLINE indicator shared by both screens.

use embedded_graphics::{mono_font::MonoFont, pixelcolor::Rgb565, prelude::*};

use crate::ui::theme::{status_color, BG};
use crate::ui::util::{fill_rect, status_text, text, Anchor};
use crate::ui::SCREEN_W;

/// Indicator centered horizontally at `y`. Outside a full redraw the strip
/// under it is cleared first so "OFFLINE" never leaves a tail behind "ONLINE".
pub fn draw_status<D>(
    target: &mut D,
    online: bool,
    y: i32,
    font: &MonoFont<'_>,
    full: bool,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let w = font.character_size.width * status_text(false).len() as u32 + 8;
    let h = font.character_size.height;
    if !full {
        fill_rect(
            target,
            SCREEN_W as i32 / 2 - w as i32 / 2,
            y - h as i32 / 2 - 1,
            w,
            h + 2,
            BG,
        )?;
    }
    text(
        target,
        status_text(online),
        SCREEN_W as i32 / 2,
        y,
        Anchor::Center,
        font,
        status_color(online),
        Some(BG),
    )
}
