//! Small drawing helpers: anchored text, filled/outlined boxes, value formatting.

use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyleBuilder},
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};

/// Where a text string hangs off its anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    TopRight,
    Center,
}

impl Anchor {
    fn split(self) -> (Alignment, Baseline) {
        match self {
            Anchor::TopLeft => (Alignment::Left, Baseline::Top),
            Anchor::TopRight => (Alignment::Right, Baseline::Top),
            Anchor::Center => (Alignment::Center, Baseline::Middle),
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn text<D>(
    target: &mut D,
    s: &str,
    x: i32,
    y: i32,
    anchor: Anchor,
    font: &MonoFont<'_>,
    fg: Rgb565,
    bg: Option<Rgb565>,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let builder = MonoTextStyleBuilder::new().font(font).text_color(fg);
    let style = match bg {
        Some(bg) => builder.background_color(bg).build(),
        None => builder.build(),
    };
    let (alignment, baseline) = anchor.split();
    let layout = TextStyleBuilder::new()
        .alignment(alignment)
        .baseline(baseline)
        .build();
    Text::with_text_style(s, Point::new(x, y), style, layout).draw(target)?;
    Ok(())
}

pub fn fill_rect<D>(target: &mut D, x: i32, y: i32, w: u32, h: u32, color: Rgb565) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    Rectangle::new(Point::new(x, y), Size::new(w, h))
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(target)
}

pub fn outline_rect<D>(target: &mut D, x: i32, y: i32, w: u32, h: u32, color: Rgb565) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    Rectangle::new(Point::new(x, y), Size::new(w, h))
        .into_styled(PrimitiveStyle::with_stroke(color, 1))
        .draw(target)
}

/// Whole-number rendering used across the panel: truncates toward zero.
pub fn whole(v: f32) -> i32 {
    v as i32
}

pub fn pct(v: f32) -> String {
    format!("{}%", whole(v))
}

pub fn status_text(online: bool) -> &'static str {
    if online {
        "ONLINE"
    } else {
        "OFFLINE"
    }
}
