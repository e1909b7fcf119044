use super::*;
use crate::geometry::Position;
use crate::template::ElementKind;

impl TemplateEditor {
    /// Place a new element of `kind` with its defaults and select it.
    pub fn create_element(&mut self, kind: ElementKind) -> ElementId {
        let id = self.allocate_id();
        let mut element = Element::new(id, kind, Position::origin());
        element.position = self.cascade_position(&element);

        let placed = self.template.push(element);
        debug_assert!(placed.is_ok(), "allocator handed out a live id");

        if kind == ElementKind::Signature {
            self.signatures.insert(id, AssetSlot::new());
        }
        self.canvas.select(Some(id));
        tracing::debug!(%id, ?kind, "element created");
        id
    }

    /// Offset from the most recent element so new ones never land exactly on it;
    /// wraps to the origin once the cascade would leave the canvas.
    fn cascade_position(&self, element: &Element) -> Position {
        let Some(last) = self.template.last() else {
            return Position::origin();
        };
        let candidate = last.position.offset(self.cascade_step, self.cascade_step);
        if fits_canvas(candidate, element, self.template.canvas()) {
            candidate
        } else {
            Position::origin()
        }
    }
}

fn fits_canvas(position: Position, element: &Element, canvas: CanvasSize) -> bool {
    let fits_axis = |coord: i32, extent: Option<u32>, axis: u32| {
        let end = i64::from(coord) + i64::from(extent.unwrap_or(0));
        coord >= 0 && i64::from(coord) < i64::from(axis) && end <= i64::from(axis)
    };
    fits_axis(position.x, element.width, canvas.width)
        && fits_axis(position.y, element.height, canvas.height)
}
