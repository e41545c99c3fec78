//! Boot splash shown until the first dashboard frame.

use embedded_graphics::{
    mono_font::ascii::{FONT_10X20, FONT_8X13},
    pixelcolor::Rgb565,
    prelude::*,
};

use crate::ui::theme::{BG, BRIGHT, TEXT};
use crate::ui::util::{text, Anchor};
use crate::ui::{SCREEN_H, SCREEN_W};

pub fn draw_splash<D>(target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let cx = SCREEN_W as i32 / 2;
    let cy = SCREEN_H as i32 / 2;
    target.clear(BG)?;
    text(target, "RBMK-1000", cx, cy - 20, Anchor::Center, &FONT_10X20, BRIGHT, None)?;
    text(target, "REACTOR CORE 4", cx, cy + 20, Anchor::Center, &FONT_8X13, TEXT, None)
}
