use egui::{PointerButton, Pos2, Rect, Vec2, pos2, vec2};

use crate::config::ZoomSettings;
use crate::geometry::ViewTransform;

/// Zoom and pan state of the canvas view.
///
/// Zoom is bounded by the configured limits; a step that would leave them is rejected
/// as a whole. Panning keeps the view over the scene rectangle, a working area around
/// the image that grows with the zoom level.
#[derive(Debug, Clone)]
pub struct Viewport {
    transform: ViewTransform,
    view_size: Vec2,
    scene_rect: Rect,
    settings: ZoomSettings,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(ZoomSettings::default())
    }
}

impl Viewport {
    pub fn new(settings: ZoomSettings) -> Self {
        Self {
            transform: ViewTransform::default(),
            view_size: Vec2::ZERO,
            scene_rect: Rect::NOTHING,
            settings,
        }
    }

    pub fn transform(&self) -> &ViewTransform {
        &self.transform
    }

    pub fn settings(&self) -> &ZoomSettings {
        &self.settings
    }

    pub fn zoom(&self) -> f32 {
        self.transform.scale
    }

    pub fn zoom_percent(&self) -> f32 {
        self.transform.scale * 100.0
    }

    pub fn view_size(&self) -> Vec2 {
        self.view_size
    }

    pub fn set_view_size(&mut self, size: Vec2, image_size: Vec2) {
        if size != self.view_size {
            self.view_size = size;
            self.update_scene_rect(image_size);
        }
    }

    pub fn to_image_space(&self, view: Pos2) -> Pos2 {
        self.transform.to_image_space(view)
    }

    pub fn to_view_space(&self, image: Pos2) -> Pos2 {
        self.transform.to_view_space(image)
    }

    /// Image point at the middle of the view
    pub fn view_center_in_image(&self) -> Pos2 {
        self.to_image_space((self.view_size / 2.0).to_pos2())
    }

    /// Scales by `factor` around `view_anchor`. Returns `false` and leaves the view as it
    /// was when the result would fall outside the zoom bounds.
    pub fn zoom_at(&mut self, view_anchor: Pos2, factor: f32, image_size: Vec2) -> bool {
        let zoom = self.transform.scale * factor;
        if !(self.settings.min_zoom..=self.settings.max_zoom).contains(&zoom) {
            log::debug!("Zoom {zoom} outside bounds, ignored");
            return false;
        }
        self.transform.zoom_around(view_anchor, factor);
        self.update_scene_rect(image_size);
        log::debug!("Zoom: {:.1}%", self.zoom_percent());
        true
    }

    /// Back to 100%, with the image centered when it fits in the view.
    pub fn reset_zoom(&mut self, image_size: Vec2) {
        self.transform.scale = 1.0;
        self.transform.offset = ((self.view_size - image_size) / 2.0).max(Vec2::ZERO);
        self.update_scene_rect(image_size);
    }

    /// Moves the view by `delta` view pixels, keeping it over the scene rectangle.
    pub fn pan_by(&mut self, delta: Vec2, image_size: Vec2) {
        self.transform.pan(delta);
        if self.scene_rect == Rect::NOTHING {
            self.update_scene_rect(image_size);
        }
        self.clamp_to_scene();
    }

    pub fn scene_rect(&self) -> Rect {
        self.scene_rect
    }

    /// Recomputes the working area around an image of `image_size`.
    ///
    /// From the margin threshold up, the scene is the image plus a fixed margin in view
    /// pixels. Below it, the scene follows the visible area, bounded between 1.1 and 1.8
    /// times the image. Either way it is centered on the image.
    pub fn update_scene_rect(&mut self, image_size: Vec2) {
        let zoom = self.transform.scale;
        let size = if zoom >= self.settings.margin_threshold {
            image_size + Vec2::splat(self.settings.scene_margin / zoom)
        } else {
            let visible = self.view_size / zoom;
            vec2(
                visible.x.min(image_size.x * 1.8).max(image_size.x * 1.1),
                visible.y.min(image_size.y * 1.8).max(image_size.y * 1.1),
            )
        };
        let center = (image_size / 2.0).to_pos2();
        self.scene_rect = Rect::from_center_size(center, size);
    }

    fn clamp_to_scene(&mut self) {
        let center = self.view_center_in_image();
        let half = self.view_size / (2.0 * self.transform.scale);
        let axis = |value: f32, min: f32, max: f32, half: f32| {
            if max - min <= 2.0 * half {
                (min + max) / 2.0
            } else {
                value.clamp(min + half, max - half)
            }
        };
        let scene = self.scene_rect;
        let target = pos2(
            axis(center.x, scene.min.x, scene.max.x, half.x),
            axis(center.y, scene.min.y, scene.max.y, half.y),
        );
        self.transform.offset -= (target - center) * self.transform.scale;
    }
}

/// Zoom-tool drag: horizontal movement zooms around the press point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomDrag {
    pub start_view: Pos2,
    pub last_view: Pos2,
    pub button: PointerButton,
}

impl ZoomDrag {
    pub fn new(start_view: Pos2, button: PointerButton) -> Self {
        Self {
            start_view,
            last_view: start_view,
            button,
        }
    }

    /// Factor for the movement since the previous call: `1 + dx / divisor`.
    pub fn step_to(&mut self, view: Pos2, divisor: f32) -> f32 {
        let dx = view.x - self.last_view.x;
        self.last_view = view;
        1.0 + dx / divisor
    }

    /// Whether releasing at `view` counts as a click rather than a drag
    pub fn is_click(&self, view: Pos2, tolerance: f32) -> bool {
        let delta = view - self.start_view;
        delta.x.abs() + delta.y.abs() <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMAGE: Vec2 = vec2(500.0, 400.0);

    #[test]
    fn zoom_outside_bounds_is_rejected() {
        let mut viewport = Viewport::default();
        assert!(viewport.zoom_at(pos2(10.0, 10.0), 100.0, IMAGE));
        assert!(!viewport.zoom_at(pos2(10.0, 10.0), 3.0, IMAGE));
        assert_eq!(viewport.zoom(), 100.0);

        viewport.reset_zoom(IMAGE);
        assert!(!viewport.zoom_at(pos2(10.0, 10.0), 0.001, IMAGE));
        assert!(!viewport.zoom_at(pos2(10.0, 10.0), -0.5, IMAGE));
        assert_eq!(viewport.zoom(), 1.0);
    }

    #[test]
    fn scene_rect_follows_zoom() {
        let mut viewport = Viewport::default();
        viewport.set_view_size(vec2(2000.0, 2000.0), IMAGE);
        // Visible area is larger than 1.8x the image
        assert_eq!(viewport.scene_rect().size(), vec2(900.0, 720.0));
        assert_eq!(viewport.scene_rect().center(), pos2(250.0, 200.0));

        assert!(viewport.zoom_at(pos2(0.0, 0.0), 8.0, IMAGE));
        assert_eq!(viewport.scene_rect().size(), vec2(600.0, 500.0));
    }

    #[test]
    fn zoom_drag_measures_steps() {
        let mut drag = ZoomDrag::new(pos2(100.0, 100.0), PointerButton::Primary);
        assert_eq!(drag.step_to(pos2(150.0, 100.0), 100.0), 1.5);
        assert!((drag.step_to(pos2(140.0, 100.0), 100.0) - 0.9).abs() < 1e-6);
        assert!(!drag.is_click(pos2(140.0, 100.0), 5.0));
        assert!(drag.is_click(pos2(103.0, 102.0), 5.0));
    }

    #[test]
    fn pan_is_limited_to_the_scene() {
        let mut viewport = Viewport::default();
        viewport.set_view_size(vec2(100.0, 100.0), IMAGE);
        viewport.pan_by(vec2(-10_000.0, 0.0), IMAGE);
        let scene = viewport.scene_rect();
        assert!((viewport.view_center_in_image().x - (scene.max.x - 50.0)).abs() < 1e-3);
    }
}
