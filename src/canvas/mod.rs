use std::sync::Arc;

use egui::{Color32, Pos2, Rect, Vec2, vec2};

mod keys;
mod pointer;

use crate::clipboard::ImageClipboard;
use crate::config::EditorConfig;
use crate::document::{BrushCursor, Document, Preview, RenderOptions};
use crate::element::{ShapeId, cancel_drag, factory};
use crate::error::{EditorError, EditorResult};
use crate::event::{CanvasEvent, CursorHint, EventBus, EventHandler, SubscriptionId};
use crate::history::History;
use crate::input::InputEvent;
use crate::io::blank_raster;
use crate::raster::Raster;
use crate::style::{CapStyle, FillChoice, FontSpec, JoinStyle, PenStyle, ToolStyle};
use crate::tools::{Gesture, PolygonDraft, ToolKind};
use crate::viewport::Viewport;

/// What [`Canvas::handle_event`] did with an event
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// Not relevant to the current tool or state
    Ignored,
    /// Consumed; transient state may have changed
    Handled,
    /// A gesture finished and changed the document
    Committed,
    /// The gesture failed and was reset without touching the document
    Abandoned(EditorError),
}

/// The editing engine: one open document, its history, the view and the active tool.
///
/// Input arrives through [`Canvas::handle_event`]; the surrounding UI calls the public
/// operations directly and listens to [`CanvasEvent`]s through [`Canvas::subscribe`].
pub struct Canvas {
    config: EditorConfig,
    document: Option<Document>,
    /// Image as first opened, for `reset_image`
    initial_image: Option<Raster>,
    history: History,
    viewport: Viewport,
    style: ToolStyle,
    tool: ToolKind,
    /// Tool to restore when Space is released
    previous_tool: Option<ToolKind>,
    gesture: Gesture,
    polygon: PolygonDraft,
    pending_text: Option<Pos2>,
    pixmap: Option<Arc<Raster>>,
    /// End of the previous brush stroke, for shift+right continuation
    last_brush_point: Option<Pos2>,
    /// Button of the press not yet released
    pressed: Option<egui::PointerButton>,
    space_held: bool,
    cursor: CursorHint,
    clipboard: Option<Box<dyn ImageClipboard>>,
    events: EventBus,
    revision: u64,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("tool", &self.tool)
            .field("gesture", &self.gesture.state_name())
            .field("image", &self.document.as_ref().map(|d| (d.width(), d.height())))
            .field("history", &self.history.len())
            .field("zoom", &self.viewport.zoom())
            .finish()
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Canvas {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            history: History::new(config.max_history_size),
            viewport: Viewport::new(config.zoom),
            style: config.style.clone(),
            config,
            document: None,
            initial_image: None,
            tool: ToolKind::default(),
            previous_tool: None,
            gesture: Gesture::Idle,
            polygon: PolygonDraft::default(),
            pending_text: None,
            pixmap: None,
            last_brush_point: None,
            pressed: None,
            space_held: false,
            cursor: CursorHint::Arrow,
            clipboard: None,
            events: EventBus::new(),
            revision: 0,
        }
    }

    pub fn with_clipboard(mut self, clipboard: Box<dyn ImageClipboard>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    pub fn set_clipboard(&mut self, clipboard: Box<dyn ImageClipboard>) {
        self.clipboard = Some(clipboard);
    }

    /// Subscribe a handler to canvas events
    pub fn subscribe(&self, handler: Box<dyn EventHandler>) -> SubscriptionId {
        self.events.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.document.is_some()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn style(&self) -> &ToolStyle {
        &self.style
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn polygon_points(&self) -> &[Pos2] {
        self.polygon.points()
    }

    pub fn pending_text(&self) -> Option<Pos2> {
        self.pending_text
    }

    pub fn cursor(&self) -> CursorHint {
        self.cursor
    }

    /// Increases whenever what [`Canvas::render_preview`] shows may have changed.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn image_size(&self) -> Vec2 {
        self.document
            .as_ref()
            .map(|d| vec2(d.width() as f32, d.height() as f32))
            .unwrap_or(Vec2::ZERO)
    }

    // --- event dispatch ---

    /// Feeds one input event through the active tool.
    ///
    /// Errors never escape: they are logged, the active gesture is dropped along with
    /// its preview and the error comes back as [`EventOutcome::Abandoned`].
    pub fn handle_event(&mut self, event: &InputEvent) -> EventOutcome {
        let result = match *event {
            InputEvent::PointerDown {
                pos,
                button,
                modifiers,
            } => self.pointer_down(pos, button, modifiers),
            InputEvent::PointerMove { pos, modifiers } => self.pointer_move(pos, modifiers),
            InputEvent::PointerUp {
                pos,
                button,
                modifiers,
            } => self.pointer_up(pos, button, modifiers),
            InputEvent::DoubleClick { pos, button, .. } => self.double_click(pos, button),
            InputEvent::Scroll { pos, delta_y, .. } => self.scroll(pos, delta_y),
            InputEvent::KeyDown {
                key,
                modifiers,
                repeat,
            } => self.key_down(key, modifiers, repeat),
            InputEvent::KeyUp { key, .. } => self.key_up(key),
        };
        match result {
            Ok(outcome) => {
                if outcome != EventOutcome::Ignored {
                    self.touch();
                }
                outcome
            }
            Err(err) => {
                if err.is_warning() {
                    log::warn!("{} gesture abandoned: {err}", self.tool.label());
                } else {
                    log::error!("{} gesture failed: {err}", self.tool.label());
                }
                self.cancel_gesture();
                self.touch();
                EventOutcome::Abandoned(err)
            }
        }
    }

    /// Drops the active gesture and any preview. Shapes being dragged go back to where
    /// the drag started and unfinished brush segments are discarded.
    pub fn cancel_gesture(&mut self) {
        let gesture = std::mem::take(&mut self.gesture);
        self.polygon.clear();
        let Some(document) = self.document.as_mut() else {
            return;
        };
        match gesture {
            Gesture::Brush(_) => document.discard_brush_stroke(),
            Gesture::Drag(drag) => {
                for id in drag.ids {
                    if let Some(shape) = document.shape_mut(id) {
                        cancel_drag(shape);
                    }
                }
            }
            _ => {}
        }
        document.clear_preview();
        self.touch();
    }

    // --- notifications ---

    fn emit(&self, event: CanvasEvent) {
        self.events.emit(event);
    }

    /// Publishes `hint` when it differs from the cursor currently shown.
    fn set_cursor(&mut self, hint: CursorHint) {
        if hint != self.cursor {
            self.cursor = hint;
            self.emit(CanvasEvent::CursorChanged(hint));
        }
    }

    fn publish_history_state(&self) {
        self.emit(CanvasEvent::UndoAvailable(self.history.can_undo()));
        self.emit(CanvasEvent::RedoAvailable(self.history.can_redo()));
    }

    fn publish_image_changed(&self) {
        if let Some(document) = &self.document {
            self.emit(CanvasEvent::ImageChanged {
                width: document.width(),
                height: document.height(),
            });
        }
    }

    fn snapshot(&mut self) {
        if let Some(document) = &self.document {
            self.history.snapshot(document);
            self.publish_history_state();
        } else {
            log::warn!("Snapshot requested without an image");
        }
    }

    // --- document replacement ---

    /// Replaces the document with `raster`: shapes are dropped and history restarts.
    pub fn open_image(&mut self, raster: Raster) {
        self.cancel_gesture();
        self.document = None;
        self.pending_text = None;
        self.last_brush_point = None;
        self.initial_image = Some(raster.clone());
        let size = vec2(raster.width() as f32, raster.height() as f32);
        self.set_image(raster, true);
        self.viewport.reset_zoom(size);
        self.emit(CanvasEvent::ZoomChanged {
            percent: self.viewport.zoom_percent(),
        });
        log::info!("Image opened: {}x{}", size.x, size.y);
    }

    /// Opens a blank image with the configured size and color.
    pub fn new_image(&mut self) {
        let settings = self.config.new_image;
        self.open_image(blank_raster(settings.width, settings.height, settings.color));
    }

    /// Replaces the raster, keeping the shapes.
    ///
    /// With `reset_history` the history is cleared and the new image becomes its
    /// baseline; otherwise the change is appended as a new snapshot.
    pub fn set_image(&mut self, raster: Raster, reset_history: bool) {
        self.cancel_gesture();
        match self.document.as_mut() {
            Some(document) => document.set_raster(raster),
            None => self.document = Some(Document::new(raster)),
        }
        if reset_history {
            self.history.reset();
        }
        self.snapshot();
        let size = self.image_size();
        self.viewport.update_scene_rect(size);
        self.publish_image_changed();
        self.touch();
        log::info!(
            "Image set: {}x{}, reset_history={reset_history}",
            size.x,
            size.y
        );
    }

    /// Goes back to the image as first opened.
    pub fn reset_image(&mut self) -> EditorResult<()> {
        let initial = self.initial_image.clone().ok_or(EditorError::NoImage)?;
        self.open_image(initial);
        Ok(())
    }

    /// Runs `filter` over the raster and records the result as a new snapshot.
    pub fn apply_filter(&mut self, filter: impl FnOnce(&Raster) -> Raster) -> EditorResult<()> {
        let document = self.document.as_ref().ok_or(EditorError::NoImage)?;
        let filtered = filter(document.raster());
        if filtered.width() == 0 || filtered.height() == 0 {
            return Err(EditorError::EmptyImage);
        }
        self.set_image(filtered, false);
        Ok(())
    }

    /// Crops the raster to `rect` (image space) clamped to the image.
    ///
    /// Shapes move with the pixels under them. History restarts from the cropped image.
    pub fn crop_to(&mut self, rect: Rect) -> EditorResult<()> {
        let document = self.document.as_mut().ok_or(EditorError::NoImage)?;
        let region = document.clamp_region(rect)?;
        let cropped = document.copy_region(region);
        document.translate_shapes(-vec2(region.x as f32, region.y as f32));
        log::info!(
            "Cropping to x={}, y={}, w={}, h={}",
            region.x,
            region.y,
            region.width,
            region.height
        );
        self.set_image(cropped, true);
        Ok(())
    }

    /// Raster and shapes composited into a new image, as saved to disk.
    pub fn flatten_to_image(&self) -> EditorResult<Raster> {
        self.document
            .as_ref()
            .map(Document::flatten_to_image)
            .ok_or(EditorError::NoImage)
    }

    /// Everything currently visible: pending brush segments, selection frames and
    /// previews included.
    pub fn render_preview(&self) -> Option<Raster> {
        self.document.as_ref().map(|d| d.render(RenderOptions::LIVE))
    }

    // --- history ---

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Steps back one snapshot. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.cancel_gesture();
        let Some(document) = self.document.as_mut() else {
            log::warn!("Nothing to undo: no image loaded");
            return false;
        };
        let Some(entry) = self.history.undo() else {
            log::warn!("Nothing to undo");
            return false;
        };
        let untracked = entry.restore_into(document);
        self.finish_restore("undo", untracked);
        true
    }

    /// Steps forward one snapshot. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        self.cancel_gesture();
        let Some(document) = self.document.as_mut() else {
            log::warn!("Nothing to redo: no image loaded");
            return false;
        };
        let Some(entry) = self.history.redo() else {
            log::warn!("Nothing to redo");
            return false;
        };
        let untracked = entry.restore_into(document);
        self.finish_restore("redo", untracked);
        true
    }

    fn finish_restore(&mut self, action: &str, untracked: usize) {
        if untracked > 0 {
            log::warn!("{action}: {untracked} path, polygon or image shapes are not tracked and stay in place");
        }
        log::info!(
            "{action} done: index={:?}, can_undo={}, can_redo={}",
            self.history.current_index(),
            self.can_undo(),
            self.can_redo()
        );
        let size = self.image_size();
        self.viewport.update_scene_rect(size);
        self.publish_image_changed();
        self.publish_history_state();
        self.touch();
    }

    // --- tools ---

    /// Switches tools. The active gesture is dropped; leaving the move tool makes every
    /// shape non-draggable again. Choosing the current tool only refreshes the cursor.
    pub fn set_tool(&mut self, tool: ToolKind) {
        let old = self.tool;
        if old != tool {
            self.cancel_gesture();
            self.pending_text = None;
            if let Some(document) = self.document.as_mut() {
                if old == ToolKind::Move {
                    for shape in document.shapes_mut() {
                        shape.set_draggable(false);
                    }
                }
                if tool != ToolKind::Brush {
                    document.set_brush_cursor(None);
                }
            }
            self.tool = tool;
            log::info!("Tool set: {tool}");
            self.emit(CanvasEvent::ToolChanged { old, new: tool });
        }
        self.cursor = tool.cursor();
        self.emit(CanvasEvent::CursorChanged(self.cursor));
        self.touch();
    }

    // --- style ---

    pub fn set_style(&mut self, style: ToolStyle) {
        self.style = style;
        self.refresh_brush_cursor();
    }

    pub fn set_first_color(&mut self, color: Color32) {
        self.style.first_color = color;
        log::info!("First color set to {color:?}");
        self.refresh_brush_cursor();
    }

    pub fn set_second_color(&mut self, color: Color32) {
        self.style.second_color = color;
        log::info!("Second color set to {color:?}");
    }

    pub fn set_text_color(&mut self, color: Color32) {
        self.style.text_color = color;
    }

    pub fn swap_colors(&mut self) {
        self.style.swap_colors();
        log::info!(
            "Colors swapped: first={:?}, second={:?}",
            self.style.first_color,
            self.style.second_color
        );
        self.refresh_brush_cursor();
    }

    pub fn set_brush_size(&mut self, size: u32) {
        self.style.set_brush_size(size);
        self.brush_size_changed();
    }

    pub fn adjust_brush_size(&mut self, amount: i32) {
        self.style.adjust_brush_size(amount);
        self.brush_size_changed();
    }

    fn brush_size_changed(&mut self) {
        log::debug!("Brush size set to {}", self.style.brush_size);
        self.emit(CanvasEvent::BrushSizeChanged(self.style.brush_size));
        self.refresh_brush_cursor();
    }

    /// Opacity in percent (0 to 100)
    pub fn set_brush_opacity(&mut self, percent: f32) {
        self.style.set_brush_opacity_percent(percent);
        log::info!("Brush opacity set to {}", self.style.brush_opacity);
        self.refresh_brush_cursor();
    }

    pub fn set_pen_style(&mut self, style: PenStyle, cap: CapStyle, join: JoinStyle) {
        self.style.pen_style = style;
        self.style.pen_cap = cap;
        self.style.pen_join = join;
    }

    pub fn set_fill(&mut self, fill: FillChoice) {
        self.style.fill = fill;
    }

    pub fn set_font(&mut self, font: FontSpec) {
        log::info!("Font set to {font}");
        self.style.font = font;
    }

    /// Picked colors become the first color and are published.
    fn pick_color(&mut self, color: Color32) {
        self.style.first_color = color;
        log::info!("Color picked: {color:?}");
        self.emit(CanvasEvent::ColorPicked(color));
    }

    /// Keeps the brush outline in sync with size and color changes.
    fn refresh_brush_cursor(&mut self) {
        let style = &self.style;
        if let Some(document) = self.document.as_mut() {
            if let Some(cursor) = document.brush_cursor().copied() {
                document.set_brush_cursor(Some(BrushCursor {
                    diameter: style.brush_size as f32,
                    color: style.brush_preview_color(),
                    ..cursor
                }));
            }
        }
        self.touch();
    }

    // --- view ---

    pub fn set_view_size(&mut self, size: Vec2) {
        let image_size = self.image_size();
        self.viewport.set_view_size(size, image_size);
    }

    /// Zooms by `factor` around a view point. Out-of-range results are ignored.
    pub fn zoom_at(&mut self, view_anchor: Pos2, factor: f32) -> bool {
        let image_size = self.image_size();
        let changed = self.viewport.zoom_at(view_anchor, factor, image_size);
        if changed {
            self.emit(CanvasEvent::ZoomChanged {
                percent: self.viewport.zoom_percent(),
            });
            self.touch();
        }
        changed
    }

    pub fn reset_zoom(&mut self) {
        if self.document.is_none() {
            return;
        }
        let image_size = self.image_size();
        self.viewport.reset_zoom(image_size);
        log::info!("Zoom reset");
        self.emit(CanvasEvent::ZoomChanged {
            percent: self.viewport.zoom_percent(),
        });
        self.touch();
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        let image_size = self.image_size();
        self.viewport.pan_by(delta, image_size);
        self.touch();
    }

    // --- shapes ---

    /// Creates a text shape at the pending text position and records it.
    pub fn submit_text(&mut self, text: &str) -> EditorResult<ShapeId> {
        let position = self.pending_text.take().ok_or(EditorError::NoPendingText)?;
        if text.trim().is_empty() {
            return Err(EditorError::EmptyText);
        }
        let item = factory::text(text, self.style.font.clone(), self.style.text_color, position);
        let document = self.document.as_mut().ok_or(EditorError::NoImage)?;
        let id = document.add_shape(item);
        log::info!("Text added at {position:?}");
        self.snapshot();
        self.touch();
        Ok(id)
    }

    pub fn cancel_text(&mut self) {
        if self.pending_text.take().is_some() {
            log::debug!("Text entry cancelled");
        }
    }

    /// Commits the polygon collected so far.
    pub fn finish_polygon(&mut self) -> EditorResult<ShapeId> {
        let pen = self.style.shape_pen();
        let fill = self.style.shape_fill();
        let document = self.document.as_mut().ok_or(EditorError::NoImage)?;
        document.clear_preview();
        let points = self.polygon.len();
        let item = self
            .polygon
            .finish(pen, fill)
            .inspect_err(|err| log::warn!("Polygon discarded: {err}"))?;
        let id = document.add_shape(item);
        log::info!("Polygon added with {points} points");
        self.touch();
        Ok(id)
    }

    /// Image inserted by the pixmap tool. `None` disables the tool until one is chosen.
    pub fn set_pixmap(&mut self, pixmap: Option<Raster>) {
        self.pixmap = pixmap.map(Arc::new);
    }

    /// Pastes the clipboard image centered in the view and records it.
    pub fn paste_from_clipboard(&mut self) -> EditorResult<ShapeId> {
        let image = self
            .clipboard
            .as_mut()
            .and_then(|clipboard| clipboard.image())
            .ok_or(EditorError::ClipboardEmpty)?;
        self.paste_image(image)
    }

    /// Adds `image` as an embedded image centered in the view and records it.
    pub fn paste_image(&mut self, image: Raster) -> EditorResult<ShapeId> {
        if image.width() == 0 || image.height() == 0 {
            return Err(EditorError::ClipboardEmpty);
        }
        let center = self.viewport.view_center_in_image();
        let position = center - vec2(image.width() as f32, image.height() as f32) / 2.0;
        let document = self.document.as_mut().ok_or(EditorError::NoImage)?;
        let id = document.add_shape(factory::image(Arc::new(image), position));
        log::info!("Image pasted at {position:?}");
        self.snapshot();
        self.touch();
        Ok(id)
    }

    /// Removes the selected shapes. Returns how many went away.
    pub fn delete_selected(&mut self) -> usize {
        let Some(document) = self.document.as_mut() else {
            return 0;
        };
        let removed = document.remove_selected();
        for shape in &removed {
            log::info!("Deleted {} {}", shape.kind_name(), shape.id());
        }
        if !removed.is_empty() {
            self.snapshot();
            self.touch();
        }
        removed.len()
    }

    fn set_preview(&mut self, preview: Preview) {
        if let Some(document) = self.document.as_mut() {
            document.set_preview(preview);
        }
    }
}
