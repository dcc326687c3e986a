use egui::{PointerButton, Pos2};

use super::{Canvas, EventOutcome};
use crate::document::{BrushCursor, Preview};
use crate::element::{begin_drag, cursor_hint, drag_to, factory, finish_drag};
use crate::error::{EditorError, EditorResult};
use crate::event::{CanvasEvent, CursorHint};
use crate::input::InputModifiers;
use crate::tools::{
    AxisLock, BandGesture, BrushStroke, DragGesture, Gesture, PathDraft, ShapeDraft, ToolKind,
};
use crate::viewport::ZoomDrag;

impl Canvas {
    pub(super) fn pointer_down(
        &mut self,
        view: Pos2,
        button: PointerButton,
        modifiers: InputModifiers,
    ) -> EditorResult<EventOutcome> {
        if self.document.is_none() || !self.gesture.is_idle() || self.pressed.is_some() {
            return Ok(EventOutcome::Ignored);
        }
        if button == PointerButton::Middle {
            return Ok(EventOutcome::Ignored);
        }
        self.pressed = Some(button);
        if self.space_held {
            self.gesture = Gesture::Pan { last_view: view };
            self.set_cursor(CursorHint::ClosedHand);
            return Ok(EventOutcome::Handled);
        }

        let image = self.viewport.to_image_space(view);
        match self.tool {
            ToolKind::Move => self.move_press(image),
            ToolKind::Brush => self.brush_press(view, image, button, modifiers),
            ToolKind::Text => {
                self.pending_text = Some(image);
                log::debug!("Text requested at {image:?}");
                self.emit(CanvasEvent::TextRequested { position: image });
                Ok(EventOutcome::Handled)
            }
            ToolKind::Crop => {
                if button != PointerButton::Primary {
                    return Ok(EventOutcome::Ignored);
                }
                let band = BandGesture::new(image);
                self.set_preview(Preview::Crop(band.rect()));
                self.gesture = Gesture::Crop(band);
                log::debug!("Crop started at {image:?}");
                Ok(EventOutcome::Handled)
            }
            ToolKind::Zoom => {
                self.gesture = Gesture::Zoom(ZoomDrag::new(view, button));
                Ok(EventOutcome::Handled)
            }
            ToolKind::Eyedropper => {
                self.sample_color(image)?;
                Ok(EventOutcome::Handled)
            }
            ToolKind::Ellipse | ToolKind::Rectangle | ToolKind::Line => {
                let Some(shape_tool) = self.tool.shape_tool() else {
                    return Ok(EventOutcome::Ignored);
                };
                let draft = ShapeDraft::new(shape_tool, image);
                self.set_preview(draft.preview(modifiers.shift));
                self.gesture = Gesture::Shape(draft);
                Ok(EventOutcome::Handled)
            }
            ToolKind::Path => {
                let draft = PathDraft::new(image);
                self.set_preview(draft.preview());
                self.gesture = Gesture::Path(draft);
                Ok(EventOutcome::Handled)
            }
            ToolKind::Pixmap => {
                if self.pixmap.is_none() {
                    return Err(EditorError::NoPixmap);
                }
                self.gesture = Gesture::Pixmap;
                Ok(EventOutcome::Handled)
            }
            ToolKind::Polygon => {
                if self.polygon.add_point(image) {
                    log::debug!("Polygon point {} at {image:?}", self.polygon.len());
                }
                let preview = self.polygon.preview();
                self.set_preview(preview);
                Ok(EventOutcome::Handled)
            }
        }
    }

    pub(super) fn pointer_move(
        &mut self,
        view: Pos2,
        modifiers: InputModifiers,
    ) -> EditorResult<EventOutcome> {
        if self.document.is_none() {
            return Ok(EventOutcome::Ignored);
        }
        if let Gesture::Pan { last_view } = &mut self.gesture {
            let delta = view - *last_view;
            *last_view = view;
            let image_size = self.image_size();
            self.viewport.pan_by(delta, image_size);
            return Ok(EventOutcome::Handled);
        }
        if self.space_held {
            return Ok(EventOutcome::Ignored);
        }

        let image = self.viewport.to_image_space(view);
        if self.tool == ToolKind::Brush {
            self.move_brush_cursor(image);
        }

        if self.gesture.is_idle() {
            return self.hover(image);
        }
        if let Gesture::BrushResize { last_x } = &mut self.gesture {
            let dx = view.x - *last_x;
            *last_x = view.x;
            if dx == 0.0 {
                return Ok(EventOutcome::Ignored);
            }
            self.adjust_brush_size(if dx > 0.0 { 1 } else { -1 });
            return Ok(EventOutcome::Handled);
        }
        if let Gesture::Zoom(drag) = &mut self.gesture {
            let factor = drag.step_to(view, self.config.zoom.drag_divisor);
            let anchor = drag.start_view;
            if factor != 1.0 {
                self.zoom_at(anchor, factor);
            }
            return Ok(EventOutcome::Handled);
        }

        let Some(document) = self.document.as_mut() else {
            return Ok(EventOutcome::Ignored);
        };
        match &mut self.gesture {
            Gesture::Shape(draft) => {
                draft.current = image;
                document.set_preview(draft.preview(modifiers.shift));
            }
            Gesture::Path(draft) => {
                draft.push(image);
                document.set_preview(draft.preview());
            }
            Gesture::Brush(stroke) => {
                if let Some(segment) = stroke.extend_to(image) {
                    document.push_brush_segment(segment);
                }
            }
            Gesture::Crop(band) => {
                band.current = image;
                document.set_preview(Preview::Crop(band.rect()));
            }
            Gesture::Drag(drag) => {
                let delta = drag.offset_to(image);
                for id in &drag.ids {
                    if let Some(shape) = document.shape_mut(*id) {
                        drag_to(shape, delta);
                    }
                }
            }
            Gesture::RubberBand(band) => {
                band.current = image;
                let rect = band.rect();
                let hits = document.shapes_intersecting(rect);
                for shape in document.shapes_mut() {
                    let hit = hits.contains(&shape.id());
                    shape.set_draggable(hit);
                    shape.set_selected(hit);
                }
                document.set_preview(Preview::RubberBand(rect));
            }
            Gesture::Idle
            | Gesture::BrushResize { .. }
            | Gesture::Zoom(_)
            | Gesture::Pan { .. }
            | Gesture::Pixmap => {}
        }
        Ok(EventOutcome::Handled)
    }

    pub(super) fn pointer_up(
        &mut self,
        view: Pos2,
        button: PointerButton,
        modifiers: InputModifiers,
    ) -> EditorResult<EventOutcome> {
        if self.document.is_none() {
            return Ok(EventOutcome::Ignored);
        }
        match self.pressed {
            None => return Err(EditorError::UnmatchedRelease),
            Some(pressed) if pressed != button => return Ok(EventOutcome::Ignored),
            Some(_) => self.pressed = None,
        }

        let image = self.viewport.to_image_space(view);
        let gesture = std::mem::take(&mut self.gesture);
        let Some(document) = self.document.as_mut() else {
            return Ok(EventOutcome::Ignored);
        };
        match gesture {
            Gesture::Idle => Ok(EventOutcome::Ignored),
            Gesture::Pan { .. } => {
                let hint = if self.space_held {
                    CursorHint::OpenHand
                } else {
                    self.tool.cursor()
                };
                self.set_cursor(hint);
                Ok(EventOutcome::Handled)
            }
            Gesture::Shape(draft) => {
                document.clear_preview();
                let item = draft.build(image, modifiers.shift, &self.style)?;
                let kind = item.kind_name();
                let bounds = item.bounding_box();
                document.add_shape(item);
                log::info!("{kind} added: {bounds:?}");
                self.snapshot();
                Ok(EventOutcome::Committed)
            }
            Gesture::Path(mut draft) => {
                document.clear_preview();
                if draft.points().last() != Some(&image) && draft.has_moved() {
                    draft.push(image);
                }
                let item = draft.build(self.style.shape_pen())?;
                document.add_shape(item);
                log::info!("Path added with {} points", draft.points().len());
                Ok(EventOutcome::Committed)
            }
            Gesture::Brush(stroke) => {
                let count = document.commit_brush_stroke();
                self.last_brush_point = Some(stroke.last_point);
                if count == 0 {
                    log::debug!("Brush released without movement");
                    return Ok(EventOutcome::Handled);
                }
                log::info!("Brush stroke applied: {count} segments");
                self.snapshot();
                self.publish_image_changed();
                Ok(EventOutcome::Committed)
            }
            Gesture::BrushResize { .. } => Ok(EventOutcome::Handled),
            Gesture::Crop(mut band) => {
                document.clear_preview();
                band.current = image;
                self.crop_to(band.rect())?;
                Ok(EventOutcome::Committed)
            }
            Gesture::Zoom(drag) => {
                let zoom = self.config.zoom;
                if drag.is_click(view, zoom.click_tolerance) {
                    let factor = if drag.button == PointerButton::Primary {
                        zoom.click_step
                    } else {
                        1.0 / zoom.click_step
                    };
                    self.zoom_at(view, factor);
                } else {
                    log::debug!("Zoom drag finished at {:.1}%", self.viewport.zoom_percent());
                }
                Ok(EventOutcome::Handled)
            }
            Gesture::Drag(drag) => {
                let mut moved = false;
                for id in &drag.ids {
                    if let Some(shape) = document.shape_mut(*id) {
                        let delta = finish_drag(shape).unwrap_or_default();
                        if delta != egui::Vec2::ZERO {
                            moved = true;
                            log::info!("Moved {} to {:?}", shape.kind_name(), shape.position());
                        }
                    }
                }
                self.set_cursor(CursorHint::OpenHand);
                if moved {
                    self.snapshot();
                    Ok(EventOutcome::Committed)
                } else {
                    Ok(EventOutcome::Handled)
                }
            }
            Gesture::RubberBand(_) => {
                document.clear_preview();
                Ok(EventOutcome::Handled)
            }
            Gesture::Pixmap => {
                let pixmap = self.pixmap.clone().ok_or(EditorError::NoPixmap)?;
                document.add_shape(factory::image(pixmap, image));
                log::info!("Pixmap inserted at {image:?}");
                Ok(EventOutcome::Committed)
            }
        }
    }

    pub(super) fn double_click(
        &mut self,
        _view: Pos2,
        button: PointerButton,
    ) -> EditorResult<EventOutcome> {
        if self.tool != ToolKind::Polygon || button != PointerButton::Primary {
            return Ok(EventOutcome::Ignored);
        }
        self.finish_polygon()?;
        Ok(EventOutcome::Committed)
    }

    pub(super) fn scroll(&mut self, view: Pos2, delta_y: f32) -> EditorResult<EventOutcome> {
        if self.document.is_none() || delta_y == 0.0 {
            return Ok(EventOutcome::Ignored);
        }
        let step = self.config.zoom.wheel_step;
        let factor = if delta_y > 0.0 { step } else { 1.0 / step };
        Ok(if self.zoom_at(view, factor) {
            EventOutcome::Handled
        } else {
            EventOutcome::Ignored
        })
    }

    fn move_press(&mut self, image: Pos2) -> EditorResult<EventOutcome> {
        let document = self.document.as_mut().ok_or(EditorError::NoImage)?;
        let Some(id) = document.top_shape_at(image) else {
            for shape in document.shapes_mut() {
                shape.set_selected(false);
            }
            let band = BandGesture::new(image);
            document.set_preview(Preview::RubberBand(band.rect()));
            self.gesture = Gesture::RubberBand(band);
            return Ok(EventOutcome::Handled);
        };

        let already_selected = document.shape(id).is_some_and(|s| s.is_selected());
        if !already_selected {
            for shape in document.shapes_mut() {
                if shape.id() != id {
                    shape.set_selected(false);
                }
            }
        }
        let shape = document.shape_mut(id).ok_or(EditorError::NoShape)?;
        shape.set_draggable(true);
        shape.set_selected(true);

        let ids = document.selected_ids();
        for id in &ids {
            if let Some(shape) = document.shape_mut(*id) {
                begin_drag(shape);
            }
        }
        log::debug!("Started moving {} shapes", ids.len());
        self.gesture = Gesture::Drag(DragGesture { press: image, ids });
        self.set_cursor(CursorHint::ClosedHand);
        Ok(EventOutcome::Handled)
    }

    fn brush_press(
        &mut self,
        view: Pos2,
        image: Pos2,
        button: PointerButton,
        modifiers: InputModifiers,
    ) -> EditorResult<EventOutcome> {
        if modifiers.alt {
            if button == PointerButton::Primary {
                self.sample_color(image)?;
            } else {
                self.gesture = Gesture::BrushResize { last_x: view.x };
            }
            return Ok(EventOutcome::Handled);
        }

        let secondary = button == PointerButton::Secondary;
        let color = if secondary && !modifiers.shift {
            self.style.second_color
        } else {
            self.style.first_color
        };
        let pen = self.style.brush_pen(color);
        let document = self.document.as_mut().ok_or(EditorError::NoImage)?;

        let continue_from = if secondary && modifiers.shift {
            self.last_brush_point
        } else {
            None
        };
        let mut stroke =
            BrushStroke::new(button, continue_from.unwrap_or(image), pen, AxisLock::Off);
        if continue_from.is_some() {
            if let Some(segment) = stroke.extend_to(image) {
                document.push_brush_segment(segment);
            }
        }
        if modifiers.shift && !secondary {
            stroke.lock = AxisLock::pending(image);
        }
        log::debug!("Brush stroke started at {image:?}");
        self.gesture = Gesture::Brush(stroke);
        Ok(EventOutcome::Handled)
    }

    fn sample_color(&mut self, image: Pos2) -> EditorResult<()> {
        let document = self.document.as_ref().ok_or(EditorError::NoImage)?;
        let color = document.sample(image)?;
        self.pick_color(color);
        Ok(())
    }

    fn move_brush_cursor(&mut self, image: Pos2) {
        let cursor = BrushCursor {
            center: image,
            diameter: self.style.brush_size as f32,
            color: self.style.brush_preview_color(),
        };
        if let Some(document) = self.document.as_mut() {
            document.set_brush_cursor(Some(cursor));
        }
    }

    /// Idle pointer movement: cursor feedback for the move tool and a rubber segment
    /// for an unfinished polygon.
    fn hover(&mut self, image: Pos2) -> EditorResult<EventOutcome> {
        let document = self.document.as_mut().ok_or(EditorError::NoImage)?;
        match self.tool {
            ToolKind::Move => {
                let hint = match document.top_shape_at(image).and_then(|id| document.shape(id)) {
                    Some(shape) => cursor_hint(shape, true),
                    None => CursorHint::Arrow,
                };
                self.set_cursor(hint);
                Ok(EventOutcome::Ignored)
            }
            ToolKind::Polygon if !self.polygon.is_empty() => {
                let mut points = self.polygon.points().to_vec();
                points.push(image);
                document.set_preview(Preview::Polygon(points));
                Ok(EventOutcome::Handled)
            }
            ToolKind::Brush => Ok(EventOutcome::Handled),
            _ => Ok(EventOutcome::Ignored),
        }
    }
}
