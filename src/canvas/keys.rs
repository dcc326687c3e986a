use egui::Key;

use super::{Canvas, EventOutcome};
use crate::error::EditorResult;
use crate::event::CursorHint;
use crate::input::InputModifiers;
use crate::tools::{Gesture, ToolKind};

impl Canvas {
    pub(super) fn key_down(
        &mut self,
        key: Key,
        modifiers: InputModifiers,
        repeat: bool,
    ) -> EditorResult<EventOutcome> {
        match key {
            Key::Space => {
                if repeat || self.space_held {
                    return Ok(EventOutcome::Ignored);
                }
                self.space_held = true;
                self.previous_tool = Some(self.tool);
                if let Gesture::RubberBand(_) = self.gesture {
                    self.cancel_gesture();
                }
                if let Some(document) = self.document.as_mut() {
                    document.set_brush_cursor(None);
                }
                self.set_cursor(CursorHint::OpenHand);
                log::debug!("Pan mode on");
                Ok(EventOutcome::Handled)
            }
            Key::Delete => Ok(if self.delete_selected() > 0 {
                EventOutcome::Committed
            } else {
                EventOutcome::Ignored
            }),
            Key::Escape => {
                if self.gesture.is_idle() && self.polygon.is_empty() {
                    return Ok(EventOutcome::Ignored);
                }
                log::debug!("{} gesture cancelled", self.gesture.state_name());
                self.cancel_gesture();
                Ok(EventOutcome::Handled)
            }
            Key::Enter if self.tool == ToolKind::Polygon => {
                self.finish_polygon()?;
                Ok(EventOutcome::Committed)
            }
            Key::Z if modifiers.ctrl && !repeat => Ok(if self.undo() {
                EventOutcome::Committed
            } else {
                EventOutcome::Ignored
            }),
            Key::Y if modifiers.ctrl && !repeat => Ok(if self.redo() {
                EventOutcome::Committed
            } else {
                EventOutcome::Ignored
            }),
            Key::V if modifiers.ctrl && !repeat => {
                if self.document.is_none() {
                    return Ok(EventOutcome::Ignored);
                }
                self.paste_from_clipboard()?;
                Ok(EventOutcome::Committed)
            }
            _ => Ok(EventOutcome::Ignored),
        }
    }

    pub(super) fn key_up(&mut self, key: Key) -> EditorResult<EventOutcome> {
        if key != Key::Space || !self.space_held {
            return Ok(EventOutcome::Ignored);
        }
        self.space_held = false;
        if let Gesture::Pan { .. } = self.gesture {
            self.gesture = Gesture::Idle;
        }
        let tool = self.previous_tool.take().unwrap_or(self.tool);
        log::debug!("Pan mode off, back to {tool}");
        self.set_tool(tool);
        Ok(EventOutcome::Handled)
    }
}
