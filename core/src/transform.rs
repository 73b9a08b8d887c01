//! Conversions between the three coordinate spaces, and the per-frame camera update.
//!
//! - pixel: `0..canvas` in device pixels
//! - screen: x in `0..1`, y in `0..inverse_aspect_ratio`, independent of window size
//! - world: camera relative, one cell of the root board is one unit

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Size of the drawing surface in device pixels.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub canvas: Vec2,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            canvas: Vec2::new(width.max(1.0), height.max(1.0)),
        }
    }

    pub fn inverse_aspect_ratio(&self) -> f32 {
        self.canvas.y / self.canvas.x
    }

    /// The whole visible area in screen space.
    pub fn screen_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, 1.0, self.inverse_aspect_ratio())
    }

    fn screen_center(&self) -> Vec2 {
        Vec2::new(0.5, 0.5 * self.inverse_aspect_ratio())
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// World position shown at the center of the screen.
    pub position: Vec2,
    /// Screen widths per world unit.
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: 0.1,
        }
    }
}

/// Camera plus viewport: the full context every space conversion needs.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CoordTransform {
    pub camera: Camera,
    pub viewport: Viewport,
}

impl CoordTransform {
    pub fn new(camera: Camera, viewport: Viewport) -> Self {
        Self { camera, viewport }
    }

    /// World-space rectangle currently visible on screen.
    pub fn camera_world_rect(&self) -> Rect {
        self.screen_to_world_rect(self.viewport.screen_rect())
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.camera.position) * self.camera.zoom + self.viewport.screen_center()
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.viewport.screen_center()) / self.camera.zoom + self.camera.position
    }

    pub fn pixel_to_screen(&self, pixel: Vec2) -> Vec2 {
        pixel / self.viewport.canvas.x
    }

    pub fn screen_to_pixel(&self, screen: Vec2) -> Vec2 {
        screen * self.viewport.canvas.x
    }

    pub fn world_to_pixel(&self, world: Vec2) -> Vec2 {
        self.screen_to_pixel(self.world_to_screen(world))
    }

    pub fn pixel_to_world(&self, pixel: Vec2) -> Vec2 {
        self.screen_to_world(self.pixel_to_screen(pixel))
    }

    pub fn world_to_screen_rect(&self, world: Rect) -> Rect {
        Rect::from_pos_size(
            self.world_to_screen(world.position()),
            world.size() * self.camera.zoom,
        )
    }

    pub fn screen_to_world_rect(&self, screen: Rect) -> Rect {
        Rect::from_pos_size(
            self.screen_to_world(screen.position()),
            screen.size() / self.camera.zoom,
        )
    }

    pub fn pixel_to_screen_rect(&self, pixel: Rect) -> Rect {
        Rect::from_pos_size(
            self.pixel_to_screen(pixel.position()),
            pixel.size() / self.viewport.canvas.x,
        )
    }

    pub fn screen_to_pixel_rect(&self, screen: Rect) -> Rect {
        Rect::from_pos_size(
            self.screen_to_pixel(screen.position()),
            screen.size() * self.viewport.canvas.x,
        )
    }

    pub fn world_to_pixel_rect(&self, world: Rect) -> Rect {
        self.screen_to_pixel_rect(self.world_to_screen_rect(world))
    }

    pub fn pixel_to_world_rect(&self, pixel: Rect) -> Rect {
        self.screen_to_world_rect(self.pixel_to_screen_rect(pixel))
    }
}

/// Wheel deltas older than this many frames are dropped, 0.85^96 is negligible.
pub const WHEEL_WINDOW: usize = 96;

/// Smoothing state for camera input, updated once per frame.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraController {
    pan_velocity: Vec2,
    zoom_velocity: f32,
    wheel: [f32; WHEEL_WINDOW],
    wheel_head: usize,
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            pan_velocity: Vec2::ZERO,
            zoom_velocity: 0.0,
            wheel: [0.0; WHEEL_WINDOW],
            wheel_head: 0,
        }
    }
}

/// Per-frame multiplier for a value that keeps `elasticity` of itself every 60Hz frame.
fn decay(elasticity: f32, dt: f32) -> f32 {
    (1.0 - (1.0 - elasticity) * dt * 60.0).clamp(0.0, 1.0)
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops all buffered motion, used when a level is (re)loaded.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Applies one frame of input to the camera, returning whether position or zoom changed.
    pub fn update(
        &mut self,
        transform: &mut CoordTransform,
        input: &FrameInput,
        dt: f32,
        config: &CameraConfig,
    ) -> bool {
        let before = transform.camera;

        self.update_keyboard(transform, input, dt, config);
        self.update_mouse(transform, input, dt, config);

        let camera = &mut transform.camera;
        camera.zoom = camera.zoom.clamp(config.zoom_min, config.zoom_max);

        camera.position != before.position || camera.zoom != before.zoom
    }

    fn update_keyboard(
        &mut self,
        transform: &mut CoordTransform,
        input: &FrameInput,
        dt: f32,
        config: &CameraConfig,
    ) {
        let keep = decay(config.elasticity, dt);
        let delta = dt * dt * 60.0;
        let keys = input.keys;

        if keys.contains(CameraKeys::UP) {
            self.pan_velocity.y -= delta;
        }
        if keys.contains(CameraKeys::LEFT) {
            self.pan_velocity.x -= delta;
        }
        if keys.contains(CameraKeys::DOWN) {
            self.pan_velocity.y += delta;
        }
        if keys.contains(CameraKeys::RIGHT) {
            self.pan_velocity.x += delta;
        }
        let camera = &mut transform.camera;
        camera.position += self.pan_velocity / camera.zoom * config.move_speed;
        self.pan_velocity *= keep;

        if keys.contains(CameraKeys::ZOOM_OUT) || input.is_down(MouseButtons::BACK) {
            self.zoom_velocity -= delta;
        }
        if keys.contains(CameraKeys::ZOOM_IN) || input.is_down(MouseButtons::FORWARD) {
            self.zoom_velocity += delta;
        }
        let factor = 1.0 + self.zoom_velocity * config.zoom_speed;
        if factor > 0.0 {
            camera.zoom *= factor;
        }
        self.zoom_velocity *= keep;
    }

    fn update_mouse(
        &mut self,
        transform: &mut CoordTransform,
        input: &FrameInput,
        dt: f32,
        config: &CameraConfig,
    ) {
        if input.is_down(MouseButtons::DRAG) {
            let drag = input.pointer_delta / transform.viewport.canvas.x / transform.camera.zoom;
            transform.camera.position -= drag;
        }

        let keep = decay(config.wheel_elasticity, dt);
        for slot in &mut self.wheel {
            *slot *= keep;
        }
        self.wheel[self.wheel_head] = input.scroll;
        self.wheel_head = (self.wheel_head + 1) % WHEEL_WINDOW;
        let wheel_avg = self.wheel.iter().sum::<f32>() / WHEEL_WINDOW as f32;

        let zoom = transform.camera.zoom;
        if wheel_avg == 0.0
            || (wheel_avg < 0.0 && zoom <= config.zoom_min)
            || (wheel_avg > 0.0 && zoom >= config.zoom_max)
        {
            return;
        }

        let factor = 1.0 + wheel_avg * dt * config.wheel_zoom_speed;
        if factor <= 0.0 {
            return;
        }
        // keep the world point under the pointer in place
        let anchor = transform.pixel_to_world(input.pointer);
        let camera = &mut transform.camera;
        camera.position = anchor - (anchor - camera.position) / factor;
        camera.zoom *= factor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform() -> CoordTransform {
        CoordTransform::new(
            Camera {
                position: Vec2::new(3.0, 2.0),
                zoom: 0.25,
            },
            Viewport::new(800.0, 400.0),
        )
    }

    fn assert_close(a: Vec2, b: Vec2) {
        assert!((a - b).length() < 1e-4, "{a:?} != {b:?}");
    }

    #[test]
    fn camera_position_maps_to_screen_center() {
        let t = transform();

        assert_close(t.world_to_screen(Vec2::new(3.0, 2.0)), Vec2::new(0.5, 0.25));
        assert_close(t.world_to_pixel(Vec2::new(3.0, 2.0)), Vec2::new(400.0, 200.0));
    }

    #[test]
    fn point_conversions_invert() {
        let t = transform();
        let p = Vec2::new(-7.5, 11.25);

        assert_close(t.screen_to_world(t.world_to_screen(p)), p);
        assert_close(t.pixel_to_world(t.world_to_pixel(p)), p);
        assert_close(t.pixel_to_screen(t.screen_to_pixel(p)), p);
    }

    #[test]
    fn rect_conversions_scale_size() {
        let t = transform();
        let world = Rect::new(3.0, 2.0, 4.0, 2.0);

        let screen = t.world_to_screen_rect(world);
        assert_eq!(screen.size(), Vec2::new(1.0, 0.5));

        let pixel = t.world_to_pixel_rect(world);
        assert_eq!(pixel.size(), Vec2::new(800.0, 400.0));
        assert_close(t.pixel_to_world_rect(pixel).position(), world.position());
    }

    #[test]
    fn camera_world_rect_covers_screen() {
        let t = transform();
        let rect = t.camera_world_rect();

        assert_close(rect.position(), Vec2::new(1.0, 1.0));
        assert_close(rect.size(), Vec2::new(4.0, 2.0));
    }

    #[test]
    fn idle_input_does_not_move_camera() {
        let mut t = transform();
        let mut controller = CameraController::new();

        let moved = controller.update(&mut t, &FrameInput::default(), 1.0 / 60.0, &CameraConfig::default());

        assert!(!moved);
        assert_eq!(t, transform());
    }

    #[test]
    fn keyboard_pan_moves_and_decelerates() {
        let mut t = transform();
        let mut controller = CameraController::new();
        let config = CameraConfig::default();
        let input = FrameInput {
            keys: CameraKeys::RIGHT,
            ..Default::default()
        };

        assert!(controller.update(&mut t, &input, 1.0 / 60.0, &config));
        assert!(t.camera.position.x > 3.0);

        let mut last = t.camera.position.x;
        let mut last_step = f32::INFINITY;
        for _ in 0..10 {
            controller.update(&mut t, &FrameInput::default(), 1.0 / 60.0, &config);
            let step = t.camera.position.x - last;
            assert!(step >= 0.0 && step <= last_step);
            last_step = step;
            last = t.camera.position.x;
        }
    }

    #[test]
    fn drag_pans_against_pointer() {
        let mut t = transform();
        let mut controller = CameraController::new();
        let input = FrameInput {
            pointer_delta: Vec2::new(200.0, 0.0),
            buttons_down: MouseButtons::LEFT,
            ..Default::default()
        };

        controller.update(&mut t, &input, 1.0 / 60.0, &CameraConfig::default());

        // 200px of 800 is a quarter screen, one world unit at zoom 0.25
        assert_close(t.camera.position, Vec2::new(2.0, 2.0));
    }

    #[test]
    fn wheel_zoom_keeps_pointer_anchored() {
        let mut t = transform();
        let mut controller = CameraController::new();
        let pointer = Vec2::new(600.0, 100.0);
        let anchor = t.pixel_to_world(pointer);
        let input = FrameInput {
            pointer,
            scroll: 1.0,
            ..Default::default()
        };

        assert!(controller.update(&mut t, &input, 1.0 / 60.0, &CameraConfig::default()));

        assert!(t.camera.zoom > 0.25);
        assert_close(t.pixel_to_world(pointer), anchor);
    }

    #[test]
    fn wheel_zoom_is_smoothed_over_frames() {
        let mut t = transform();
        let mut controller = CameraController::new();
        let config = CameraConfig::default();
        let input = FrameInput {
            scroll: 1.0,
            ..Default::default()
        };

        controller.update(&mut t, &input, 1.0 / 60.0, &config);
        let after_first = t.camera.zoom;
        assert!(controller.update(&mut t, &FrameInput::default(), 1.0 / 60.0, &config));
        assert!(t.camera.zoom > after_first);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut t = transform();
        let mut controller = CameraController::new();
        let config = CameraConfig::default();
        let input = FrameInput {
            keys: CameraKeys::ZOOM_OUT,
            ..Default::default()
        };

        for _ in 0..2000 {
            controller.update(&mut t, &input, 1.0 / 60.0, &config);
        }

        assert_eq!(t.camera.zoom, config.zoom_min);
    }
}
