use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};

bitflags! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MouseButtons: u8 {
        const LEFT    = 1;
        const RIGHT   = 1 << 1;
        const MIDDLE  = 1 << 2;
        const BACK    = 1 << 3;
        const FORWARD = 1 << 4;
    }
}

bitflags! {
    /// Held camera keys, already mapped from whatever physical keys the frontend binds.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CameraKeys: u8 {
        const UP       = 1;
        const DOWN     = 1 << 1;
        const LEFT     = 1 << 2;
        const RIGHT    = 1 << 3;
        const ZOOM_IN  = 1 << 4;
        const ZOOM_OUT = 1 << 5;
    }
}

impl MouseButtons {
    /// Buttons whose drag pans the camera.
    pub const DRAG: Self = Self::LEFT.union(Self::RIGHT).union(Self::MIDDLE);
}

/// Everything the core reads from the outside world in one frame.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameInput {
    /// Pointer position in device pixels.
    pub pointer: Vec2,
    /// Pointer movement since the last frame, in device pixels.
    pub pointer_delta: Vec2,
    pub buttons_down: MouseButtons,
    pub buttons_pressed: MouseButtons,
    pub buttons_released: MouseButtons,
    pub keys: CameraKeys,
    /// Wheel movement, positive zooms in.
    pub scroll: f32,
    /// Set by the UI layer while a widget owns the pointer.
    pub pointer_over_ui: bool,
    pub restart: bool,
}

impl FrameInput {
    /// Moves the pointer to `pointer`, deriving the delta from the previous position.
    pub fn move_pointer(&mut self, pointer: Vec2) {
        self.pointer_delta = pointer - self.pointer;
        self.pointer = pointer;
    }

    /// Replaces the held buttons, deriving pressed and released edges from the previous set.
    pub fn set_buttons(&mut self, down: MouseButtons) {
        self.buttons_pressed = down.difference(self.buttons_down);
        self.buttons_released = self.buttons_down.difference(down);
        self.buttons_down = down;
    }

    /// Clears per-frame edges and deltas, keeping held state for the next frame.
    pub fn next_frame(&mut self) {
        self.pointer_delta = Vec2::ZERO;
        self.buttons_pressed = MouseButtons::empty();
        self.buttons_released = MouseButtons::empty();
        self.scroll = 0.0;
        self.restart = false;
    }

    pub fn is_down(&self, buttons: MouseButtons) -> bool {
        self.buttons_down.intersects(buttons)
    }

    pub fn is_up(&self, buttons: MouseButtons) -> bool {
        !self.buttons_down.intersects(buttons)
    }

    pub fn is_pressed(&self, buttons: MouseButtons) -> bool {
        self.buttons_pressed.intersects(buttons)
    }

    pub fn is_released(&self, buttons: MouseButtons) -> bool {
        self.buttons_released.intersects(buttons)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_edges_follow_held_state() {
        let mut input = FrameInput::default();

        input.set_buttons(MouseButtons::LEFT);
        assert!(input.is_pressed(MouseButtons::LEFT));
        assert!(!input.is_released(MouseButtons::LEFT));

        input.next_frame();
        input.set_buttons(MouseButtons::LEFT | MouseButtons::RIGHT);
        assert!(!input.is_pressed(MouseButtons::LEFT));
        assert!(input.is_pressed(MouseButtons::RIGHT));
        assert!(input.is_down(MouseButtons::LEFT));

        input.next_frame();
        input.set_buttons(MouseButtons::empty());
        assert!(input.is_released(MouseButtons::LEFT | MouseButtons::RIGHT));
        assert!(input.is_up(MouseButtons::DRAG));
    }

    #[test]
    fn pointer_delta_is_derived() {
        let mut input = FrameInput::default();
        input.move_pointer(Vec2::new(10.0, 5.0));
        input.next_frame();
        input.move_pointer(Vec2::new(12.0, 4.0));

        assert_eq!(input.pointer_delta, Vec2::new(2.0, -1.0));
    }
}
