//! Design-time certificate layout: placed elements over a background image.

pub mod element;
pub mod style;

pub use element::{
    Element, ElementContent, ElementField, ElementId, ElementKind, DEFAULT_QR_SIZE,
    DEFAULT_SIGNATURE_WIDTH, WIDTH_MAX, WIDTH_MIN,
};
pub use style::{
    FontFamily, FontStyle, FontWeight, TextAlign, TextStyle, DEFAULT_FONT_SIZE, FONT_SIZE_MAX,
    FONT_SIZE_MIN,
};

use crate::asset::AssetRef;
use crate::geometry::CanvasSize;

/// Ordered elements (insertion order is paint order) over a fixed canvas.
///
/// Mutation goes through the editor; the template itself only guarantees that
/// ids are unique and that pushed elements are clamped into the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Template {
    canvas: CanvasSize,
    background: Option<AssetRef>,
    elements: Vec<Element>,
}

impl Template {
    pub fn new(canvas: CanvasSize) -> Self {
        Self {
            canvas,
            background: None,
            elements: Vec::new(),
        }
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn background(&self) -> Option<&AssetRef> {
        self.background.as_ref()
    }

    /// Without a background the template can be edited but not exported or rendered.
    pub fn is_draft(&self) -> bool {
        self.background.is_none()
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|element| element.id == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.element(id).is_some()
    }

    pub fn last(&self) -> Option<&Element> {
        self.elements.last()
    }

    pub fn max_id(&self) -> Option<ElementId> {
        self.elements.iter().map(|element| element.id).max()
    }

    pub(crate) fn set_background(&mut self, background: Option<AssetRef>) {
        self.background = background;
    }

    pub(crate) fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|element| element.id == id)
    }

    /// Append `element` on top, or hand it back if its id is taken.
    pub(crate) fn push(&mut self, mut element: Element) -> Result<ElementId, Element> {
        if self.contains(element.id) {
            return Err(element);
        }
        element.clamp_into(self.canvas);
        let id = element.id;
        self.elements.push(element);
        Ok(id)
    }

    pub(crate) fn remove(&mut self, id: ElementId) -> Option<Element> {
        let index = self.elements.iter().position(|element| element.id == id)?;
        Some(self.elements.remove(index))
    }
}
