//! Hardware seams polled once per loop iteration. None of these may block.

use std::collections::VecDeque;

/// Non-blocking byte source: `None` when nothing is buffered right now.
pub trait SerialRx {
    fn poll_byte(&mut self) -> Option<u8>;
}

impl<S: SerialRx + ?Sized> SerialRx for Box<S> {
    fn poll_byte(&mut self) -> Option<u8> {
        (**self).poll_byte()
    }
}

impl SerialRx for VecDeque<u8> {
    fn poll_byte(&mut self) -> Option<u8> {
        self.pop_front()
    }
}

/// Level of the single mode button (true while held down).
pub trait Button {
    fn is_pressed(&mut self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchPoint {
    pub x: u16,
    pub y: u16,
    pub pressure: u16,
}

pub trait TouchInput {
    fn read(&mut self) -> Option<TouchPoint>;
}

/// Panel without a touch surface.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTouch;

impl TouchInput for NoTouch {
    fn read(&mut self) -> Option<TouchPoint> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    ButtonPressed,
    Touch { x: u16 },
}

/// Press-edge detector: reports true once per released-to-pressed transition.
#[derive(Debug, Default)]
pub struct ButtonEdge {
    was_pressed: bool,
}

impl ButtonEdge {
    pub fn update(&mut self, pressed: bool) -> bool {
        let edge = pressed && !self.was_pressed;
        self.was_pressed = pressed;
        edge
    }
}
