use super::*;
use crate::geometry::{clamp_axis, Position};

/// An in-flight drag: where the element was when the gesture began.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragGesture {
    pub id: ElementId,
    pub origin: Position,
}

/// Selection and drag state shared by the canvas view and the property panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanvasController {
    selected: Option<ElementId>,
    drag: Option<DragGesture>,
}

impl CanvasController {
    pub fn selected(&self) -> Option<ElementId> {
        self.selected
    }

    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selected == Some(id)
    }

    pub fn active_drag(&self) -> Option<DragGesture> {
        self.drag
    }

    pub(crate) fn select(&mut self, id: Option<ElementId>) {
        self.selected = id;
    }

    /// Drop every reference to a removed element.
    pub(crate) fn forget(&mut self, id: ElementId) {
        if self.selected == Some(id) {
            self.selected = None;
        }
        if self.drag.is_some_and(|drag| drag.id == id) {
            self.drag = None;
        }
    }
}

fn dragged_position(
    origin: Position,
    delta: (i32, i32),
    element: &Element,
    canvas: CanvasSize,
) -> Position {
    let moved = origin.offset(delta.0, delta.1);
    Position::new(
        clamp_axis(moved.x, element.width, canvas.width),
        clamp_axis(moved.y, element.height, canvas.height),
    )
}

impl TemplateEditor {
    /// `None` clears the selection; unknown ids leave it untouched.
    pub fn select_element(&mut self, id: Option<ElementId>) -> bool {
        match id {
            None => {
                self.canvas.select(None);
                true
            }
            Some(id) if self.template.contains(id) => {
                self.canvas.select(Some(id));
                true
            }
            Some(id) => {
                tracing::debug!(%id, "ignoring selection of unknown element");
                false
            }
        }
    }

    pub fn begin_drag(&mut self, id: ElementId) -> bool {
        if self.canvas.drag.is_some() {
            self.cancel_drag();
        }
        if self.is_asset_pending(id) {
            tracing::debug!(%id, "element is waiting on an upload; drag ignored");
            return false;
        }
        let Some(element) = self.template.element(id) else {
            tracing::debug!(%id, "ignoring drag of unknown element");
            return false;
        };
        self.canvas.drag = Some(DragGesture {
            id,
            origin: element.position,
        });
        self.canvas.select(Some(id));
        true
    }

    /// Live position while the pointer moves, relative to the gesture origin.
    /// An upload that started mid-gesture aborts it.
    pub fn drag_to(&mut self, delta_x: i32, delta_y: i32) -> bool {
        let Some(drag) = self.canvas.drag else {
            return false;
        };
        if self.is_asset_pending(drag.id) {
            tracing::debug!(id = %drag.id, "element is waiting on an upload; drag aborted");
            self.cancel_drag();
            return false;
        }
        let canvas = self.template.canvas();
        let Some(element) = self.template.element_mut(drag.id) else {
            self.canvas.drag = None;
            return false;
        };
        element.position = dragged_position(drag.origin, (delta_x, delta_y), element, canvas);
        true
    }

    /// Commit a drag. Without a preceding [`begin_drag`](Self::begin_drag) the
    /// delta applies to the element's current position. A refused commit
    /// restores the gesture origin; a gesture on another element is cancelled.
    pub fn on_drag_end(&mut self, id: ElementId, delta_x: i32, delta_y: i32) -> bool {
        let gesture = self.canvas.drag.filter(|drag| drag.id == id);
        let pending = self.is_asset_pending(id);
        if gesture.is_none() || pending {
            self.cancel_drag();
        }
        self.canvas.drag = None;

        if pending {
            tracing::debug!(%id, "element is waiting on an upload; drag ignored");
            return false;
        }
        let canvas = self.template.canvas();
        let Some(element) = self.template.element_mut(id) else {
            tracing::debug!(%id, "ignoring drag of unknown element");
            return false;
        };
        let origin = gesture.map_or(element.position, |drag| drag.origin);
        element.position = dragged_position(origin, (delta_x, delta_y), element, canvas);
        tracing::debug!(%id, x = element.position.x, y = element.position.y, "element moved");
        true
    }

    /// Abort the gesture and put the element back where it started, pulled in
    /// only if it was resized mid-gesture and no longer fits there.
    pub fn cancel_drag(&mut self) -> bool {
        let Some(drag) = self.canvas.drag.take() else {
            return false;
        };
        let canvas = self.template.canvas();
        match self.template.element_mut(drag.id) {
            Some(element) => {
                element.position = drag.origin;
                element.clamp_into(canvas);
                true
            }
            None => false,
        }
    }
}
