use egui::{Pos2, Vec2};
use serde::{Deserialize, Serialize};

use crate::event::CursorHint;

/// Interaction flags shared by every shape.
///
/// Shapes start out neither selectable nor movable; the move tool enables both on the
/// shapes it picks up and disables them again when another tool is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DragState {
    pub selectable: bool,
    pub movable: bool,
    pub selected: bool,
    /// Anchor position recorded when the current drag started
    #[serde(skip)]
    pub drag_origin: Option<Pos2>,
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        self.drag_origin.is_some()
    }
}

/// Anything that can be picked up and moved by the move tool.
pub trait Draggable {
    fn drag_state(&self) -> &DragState;
    fn drag_state_mut(&mut self) -> &mut DragState;
    fn anchor(&self) -> Pos2;
    fn set_anchor(&mut self, anchor: Pos2);
}

pub fn enable_dragging<T: Draggable + ?Sized>(item: &mut T) {
    let state = item.drag_state_mut();
    state.selectable = true;
    state.movable = true;
}

/// Clears both flags. An item that is no longer selectable is also deselected.
pub fn disable_dragging<T: Draggable + ?Sized>(item: &mut T) {
    let state = item.drag_state_mut();
    state.selectable = false;
    state.movable = false;
    state.selected = false;
    state.drag_origin = None;
}

/// Selection is ignored on items that are not selectable.
pub fn set_selected<T: Draggable + ?Sized>(item: &mut T, selected: bool) {
    let state = item.drag_state_mut();
    state.selected = selected && state.selectable;
}

/// Records the pre-drag anchor. Returns the cursor to show, or `None` when the item
/// can't be dragged right now.
pub fn begin_drag<T: Draggable + ?Sized>(item: &mut T) -> Option<CursorHint> {
    let anchor = item.anchor();
    let state = item.drag_state_mut();
    if !(state.movable && state.selected) {
        return None;
    }
    state.drag_origin = Some(anchor);
    Some(CursorHint::ClosedHand)
}

/// Places the item at its pre-drag anchor plus `delta`.
pub fn drag_to<T: Draggable + ?Sized>(item: &mut T, delta: Vec2) {
    if let Some(origin) = item.drag_state().drag_origin {
        item.set_anchor(origin + delta);
    }
}

/// Ends the drag and reports how far the item travelled.
pub fn finish_drag<T: Draggable + ?Sized>(item: &mut T) -> Option<Vec2> {
    let origin = item.drag_state_mut().drag_origin.take()?;
    Some(item.anchor() - origin)
}

/// Puts the item back where the drag started.
pub fn cancel_drag<T: Draggable + ?Sized>(item: &mut T) {
    if let Some(origin) = item.drag_state_mut().drag_origin.take() {
        item.set_anchor(origin);
    }
}

pub fn cursor_hint<T: Draggable + ?Sized>(item: &T, hovering: bool) -> CursorHint {
    let state = item.drag_state();
    if state.is_dragging() {
        CursorHint::ClosedHand
    } else if hovering && state.selected && state.movable {
        CursorHint::OpenHand
    } else if hovering {
        CursorHint::PointingHand
    } else {
        CursorHint::Arrow
    }
}
