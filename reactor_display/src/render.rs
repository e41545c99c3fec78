//! Off-screen frame and the draw strategy that decides how frames reach the panel.

use std::convert::Infallible;

use embedded_graphics::{pixelcolor::Rgb565, prelude::*, primitives::Rectangle};
use tracing::{info, warn};

use crate::ui::{draw_screen, splash::draw_splash, theme::BG, View};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawStrategy {
    /// Compose the whole frame off-screen, then push it in one blit.
    Buffered,
    /// Draw straight onto the panel, field by field. Lower memory, visible flicker.
    Direct,
}

/// What the last draw touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redraw {
    /// Background and static chrome were repainted along with the values.
    Full,
    /// Only dynamic fields were repainted.
    Fields,
}

/// Row-major RGB565 pixel store. Also used as the in-memory panel in tests
/// and by the terminal emulator.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    size: Size,
    pixels: Vec<Rgb565>,
}

impl FrameBuffer {
    /// Allocate a frame, or `None` when memory for it is not available.
    pub fn try_new(size: Size) -> Option<Self> {
        let len = (size.width as usize).checked_mul(size.height as usize)?;
        let mut pixels = Vec::new();
        pixels.try_reserve_exact(len).ok()?;
        pixels.resize(len, BG);
        Some(Self { size, pixels })
    }

    pub fn pixels(&self) -> &[Rgb565] {
        &self.pixels
    }

    pub fn pixel(&self, p: Point) -> Option<Rgb565> {
        self.index(p).map(|i| self.pixels[i])
    }

    fn index(&self, p: Point) -> Option<usize> {
        let (w, h) = (self.size.width as i32, self.size.height as i32);
        if p.x < 0 || p.y < 0 || p.x >= w || p.y >= h {
            return None;
        }
        Some(p.y as usize * w as usize + p.x as usize)
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, color) in pixels {
            if let Some(i) = self.index(p) {
                self.pixels[i] = color;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.pixels.fill(color);
        Ok(())
    }
}

fn infallible<T>(r: Result<T, Infallible>) -> T {
    match r {
        Ok(v) => v,
        Err(never) => match never {},
    }
}

pub struct Renderer {
    frame: Option<FrameBuffer>,
}

impl Renderer {
    /// Build a renderer for a panel of `size`. A `Buffered` request that
    /// cannot get its frame memory degrades to `Direct`, with a warning.
    pub fn new(strategy: DrawStrategy, size: Size) -> Self {
        let frame = match strategy {
            DrawStrategy::Buffered => {
                let frame = FrameBuffer::try_new(size);
                match &frame {
                    Some(_) => info!(
                        width = size.width,
                        height = size.height,
                        "off-screen frame allocated"
                    ),
                    None => warn!(
                        width = size.width,
                        height = size.height,
                        "no memory for off-screen frame; drawing direct to panel (expect flicker)"
                    ),
                }
                frame
            }
            DrawStrategy::Direct => {
                info!("drawing direct to panel");
                None
            }
        };
        Self { frame }
    }

    /// Strategy actually in effect (after any fallback).
    pub fn strategy(&self) -> DrawStrategy {
        if self.frame.is_some() {
            DrawStrategy::Buffered
        } else {
            DrawStrategy::Direct
        }
    }

    /// Draw one dashboard frame onto `panel`.
    ///
    /// Buffered frames are always composed in full and blitted. Direct frames
    /// repaint chrome only when `mode_changed`.
    pub fn draw<P>(&mut self, panel: &mut P, view: View<'_>, mode_changed: bool) -> Result<Redraw, P::Error>
    where
        P: DrawTarget<Color = Rgb565>,
    {
        match self.frame.as_mut() {
            Some(frame) => {
                infallible(draw_screen(frame, view, true));
                blit(panel, frame)?;
                Ok(Redraw::Full)
            }
            None => {
                draw_screen(panel, view, mode_changed)?;
                Ok(if mode_changed { Redraw::Full } else { Redraw::Fields })
            }
        }
    }

    pub fn draw_splash<P>(&mut self, panel: &mut P) -> Result<(), P::Error>
    where
        P: DrawTarget<Color = Rgb565>,
    {
        match self.frame.as_mut() {
            Some(frame) => {
                infallible(draw_splash(frame));
                blit(panel, frame)
            }
            None => draw_splash(panel),
        }
    }
}

fn blit<P>(panel: &mut P, frame: &FrameBuffer) -> Result<(), P::Error>
where
    P: DrawTarget<Color = Rgb565>,
{
    let area = Rectangle::new(Point::zero(), frame.size());
    panel.fill_contiguous(&area, frame.pixels().iter().copied())
}
