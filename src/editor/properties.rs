use serde::Deserialize;

use super::*;
use crate::geometry::{clamp_axis, Color, Position};
use crate::template::{
    ElementField, ElementKind, FontFamily, FontStyle, FontWeight, TextAlign, TextStyle,
};

/// Raw numeric form input: either a number or the text typed into the field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    /// Finite value, or `None` when the input is not a number.
    pub fn value(&self) -> Option<f64> {
        let value = match self {
            Self::Number(value) => *value,
            Self::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for NumericInput {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for NumericInput {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for NumericInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Partial attribute update. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementPatch {
    pub x: Option<NumericInput>,
    pub y: Option<NumericInput>,
    pub width: Option<NumericInput>,
    pub font_size: Option<NumericInput>,
    pub color: Option<String>,
    pub font_family: Option<String>,
    pub font_weight: Option<FontWeight>,
    pub font_style: Option<FontStyle>,
    pub text_align: Option<TextAlign>,
    pub content: Option<String>,
    pub required: Option<bool>,
}

impl ElementPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn x(mut self, x: impl Into<NumericInput>) -> Self {
        self.x = Some(x.into());
        self
    }

    pub fn y(mut self, y: impl Into<NumericInput>) -> Self {
        self.y = Some(y.into());
        self
    }

    pub fn width(mut self, width: impl Into<NumericInput>) -> Self {
        self.width = Some(width.into());
        self
    }

    pub fn font_size(mut self, size: impl Into<NumericInput>) -> Self {
        self.font_size = Some(size.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    pub fn font_weight(mut self, weight: FontWeight) -> Self {
        self.font_weight = Some(weight);
        self
    }

    pub fn font_style(mut self, style: FontStyle) -> Self {
        self.font_style = Some(style);
        self
    }

    pub fn text_align(mut self, align: TextAlign) -> Self {
        self.text_align = Some(align);
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }
}

/// What an update did, field by field. Nothing here is an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchReport {
    /// `false` when the id did not name a live element.
    pub found: bool,
    pub applied: Vec<ElementField>,
    /// Malformed input; the previous value was kept.
    pub rejected: Vec<ElementField>,
    /// Not meaningful for this element kind; ignored.
    pub unsupported: Vec<ElementField>,
}

impl PatchReport {
    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

struct FieldSettler<'a> {
    report: &'a mut PatchReport,
    id: ElementId,
    kind: ElementKind,
}

impl FieldSettler<'_> {
    /// Skip fields the kind does not carry; otherwise record whether `apply` took.
    fn field(&mut self, field: ElementField, apply: impl FnOnce() -> bool) {
        if !self.kind.supports(field) {
            self.report.unsupported.push(field);
        } else if apply() {
            self.report.applied.push(field);
        } else {
            tracing::warn!(id = %self.id, ?field, "rejected malformed property value");
            self.report.rejected.push(field);
        }
    }
}

impl TemplateEditor {
    /// Merge `patch` into the element. Malformed values keep the old value,
    /// unsupported ones are skipped, and the rest still apply.
    pub fn update(&mut self, id: ElementId, patch: ElementPatch) -> PatchReport {
        let mut report = PatchReport::default();
        let pending = self.is_asset_pending(id);
        let canvas = self.template.canvas();
        let Some(element) = self.template.element_mut(id) else {
            tracing::debug!(%id, "ignoring update of unknown element");
            return report;
        };
        report.found = true;
        let mut settle = FieldSettler {
            report: &mut report,
            id,
            kind: element.kind(),
        };

        if let Some(input) = &patch.x {
            settle.field(ElementField::X, || set_coordinate(element, input, Axis::X, canvas));
        }
        if let Some(input) = &patch.y {
            settle.field(ElementField::Y, || set_coordinate(element, input, Axis::Y, canvas));
        }
        if let Some(input) = &patch.width {
            settle.field(ElementField::Width, || match input.value() {
                Some(width) if !pending => {
                    element.set_width(width);
                    true
                }
                _ => false,
            });
        }
        if let Some(input) = &patch.font_size {
            settle.field(ElementField::FontSize, || {
                with_style(element, |style| {
                    input.value().map(|size| style.set_font_size(size)).is_some()
                })
            });
        }
        if let Some(raw) = &patch.color {
            settle.field(ElementField::Color, || {
                with_style(element, |style| {
                    Color::parse_hex(raw).map(|color| style.set_color(color)).is_some()
                })
            });
        }
        if let Some(raw) = &patch.font_family {
            settle.field(ElementField::FontFamily, || {
                with_style(element, |style| {
                    FontFamily::from_name(raw)
                        .map(|family| style.set_font_family(family))
                        .is_some()
                })
            });
        }
        if let Some(weight) = patch.font_weight {
            settle.field(ElementField::FontWeight, || {
                with_style(element, |style| {
                    style.set_font_weight(weight);
                    true
                })
            });
        }
        if let Some(font_style) = patch.font_style {
            settle.field(ElementField::FontStyle, || {
                with_style(element, |style| {
                    style.set_font_style(font_style);
                    true
                })
            });
        }
        if let Some(align) = patch.text_align {
            settle.field(ElementField::TextAlign, || {
                with_style(element, |style| {
                    style.set_text_align(align);
                    true
                })
            });
        }
        if let Some(content) = patch.content {
            settle.field(ElementField::Content, || match &mut element.content {
                ElementContent::StaticText { text } => {
                    *text = content;
                    true
                }
                _ => false,
            });
        }
        if let Some(flag) = patch.required {
            settle.field(ElementField::Required, || match &mut element.content {
                ElementContent::Signature { required, .. } => {
                    *required = flag;
                    true
                }
                _ => false,
            });
        }

        element.clamp_into(canvas);
        if report.changed() {
            tracing::debug!(%id, applied = ?report.applied, "element updated");
        }
        report
    }

    /// Delete the element; clears the selection if it was selected.
    pub fn remove(&mut self, id: ElementId) -> bool {
        let Some(removed) = self.template.remove(id) else {
            tracing::debug!(%id, "ignoring removal of unknown element");
            return false;
        };
        self.canvas.forget(id);
        self.signatures.remove(&id);
        tracing::debug!(%id, kind = ?removed.kind(), "element removed");
        true
    }

    pub fn remove_selected(&mut self) -> bool {
        match self.canvas.selected() {
            Some(id) => self.remove(id),
            None => false,
        }
    }
}

#[derive(Clone, Copy)]
enum Axis {
    X,
    Y,
}

fn with_style(element: &mut Element, apply: impl FnOnce(&mut TextStyle) -> bool) -> bool {
    element.style.as_mut().is_some_and(apply)
}

fn set_coordinate(
    element: &mut Element,
    input: &NumericInput,
    axis: Axis,
    canvas: CanvasSize,
) -> bool {
    let Some(value) = input.value() else {
        return false;
    };
    let coord = value.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32;
    let Position { x, y } = element.position;
    element.position = match axis {
        Axis::X => Position::new(clamp_axis(coord, element.width, canvas.width), y),
        Axis::Y => Position::new(x, clamp_axis(coord, element.height, canvas.height)),
    };
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{FONT_SIZE_MAX, FONT_SIZE_MIN};
    use pretty_assertions::assert_eq;

    fn editor_with(kind: ElementKind) -> (TemplateEditor, ElementId) {
        let mut editor = TemplateEditor::default();
        let id = editor.create_element(kind);
        (editor, id)
    }

    fn style_of(editor: &TemplateEditor, id: ElementId) -> TextStyle {
        editor
            .element(id)
            .and_then(|element| element.style)
            .expect("text element should have a style")
    }

    #[test]
    fn font_size_is_clamped_both_ways() {
        let (mut editor, id) = editor_with(ElementKind::StudentName);
        editor.update(id, ElementPatch::new().font_size(500));
        assert_eq!(style_of(&editor, id).font_size, FONT_SIZE_MAX);
        editor.update(id, ElementPatch::new().font_size(-5));
        assert_eq!(style_of(&editor, id).font_size, FONT_SIZE_MIN);
    }

    #[test]
    fn non_numeric_input_keeps_previous_values() {
        let (mut editor, id) = editor_with(ElementKind::QrCode);
        editor.update(id, ElementPatch::new().x(40).y("25").width(120));
        let before = editor.element(id).cloned().expect("element should exist");

        let report = editor.update(
            id,
            ElementPatch::new().x("abc").y("").width("wide").font_size("big"),
        );
        assert_eq!(editor.element(id), Some(&before));
        assert_eq!(
            report.rejected,
            vec![ElementField::X, ElementField::Y, ElementField::Width]
        );
        assert_eq!(report.unsupported, vec![ElementField::FontSize]);
        assert_eq!(before.position, Position::new(40, 25));
    }

    #[test]
    fn malformed_color_is_retained_unchanged() {
        let (mut editor, id) = editor_with(ElementKind::CourseName);
        editor.update(id, ElementPatch::new().color("#ABCDEF"));
        let report = editor.update(id, ElementPatch::new().color("blue"));
        assert_eq!(report.rejected, vec![ElementField::Color]);
        assert_eq!(style_of(&editor, id).color.to_hex(), "#abcdef");
    }

    #[test]
    fn unsupported_fields_are_skipped_while_others_apply() {
        let (mut editor, id) = editor_with(ElementKind::QrCode);
        let report = editor.update(
            id,
            ElementPatch::new().content("hello").color("#ff0000").x(10),
        );
        assert_eq!(report.applied, vec![ElementField::X]);
        assert_eq!(
            report.unsupported,
            vec![ElementField::Color, ElementField::Content]
        );
        let element = editor.element(id).expect("element should exist");
        assert_eq!(element.position.x, 10);
        assert_eq!(element.style, None);
        assert_eq!(element.text(), None);
    }

    #[test]
    fn static_text_content_and_style_merge() {
        let (mut editor, id) = editor_with(ElementKind::StaticText);
        editor.update(
            id,
            ElementPatch::new()
                .content("شهادة إتمام")
                .font_family("amiri")
                .font_weight(FontWeight::Bold)
                .text_align(TextAlign::Center),
        );
        let element = editor.element(id).expect("element should exist");
        let style = element.style.expect("text style");
        assert_eq!(element.text(), Some("شهادة إتمام"));
        assert_eq!(style.font_family, FontFamily::Amiri);
        assert_eq!(style.font_weight, FontWeight::Bold);
        assert_eq!(style.text_align, TextAlign::Center);
        assert_eq!(style.font_style, FontStyle::Normal);
        assert_eq!(style.font_size, 16);
    }

    #[test]
    fn width_is_clamped_and_box_stays_inside_canvas() {
        let (mut editor, id) = editor_with(ElementKind::QrCode);
        editor.on_drag_end(id, 800, 550);
        editor.update(id, ElementPatch::new().width(10_000));
        let element = editor.element(id).expect("element should exist");
        assert_eq!((element.width, element.height), (Some(500), Some(500)));
        assert_eq!(element.position, Position::new(342, 95));
    }

    #[test]
    fn coordinates_are_clamped_to_canvas() {
        let (mut editor, id) = editor_with(ElementKind::QrCode);
        editor.update(id, ElementPatch::new().x(-40).y(10_000));
        let element = editor.element(id).expect("element should exist");
        assert_eq!(element.position, Position::new(0, 495));
    }

    #[test]
    fn update_of_unknown_element_reports_not_found() {
        let mut editor = TemplateEditor::default();
        let report = editor.update(ElementId::new(7), ElementPatch::new().x(1));
        assert_eq!(report, PatchReport::default());
    }

    #[test]
    fn removing_selected_element_clears_selection() {
        let (mut editor, id) = editor_with(ElementKind::SerialNumber);
        assert_eq!(editor.selected_id(), Some(id));
        assert!(editor.remove(id));
        assert_eq!(editor.selected_id(), None);
        assert!(!editor.remove(id));
    }

    #[test]
    fn removing_other_element_keeps_selection() {
        let (mut editor, first) = editor_with(ElementKind::SerialNumber);
        let second = editor.create_element(ElementKind::IssueDate);
        assert!(editor.select_element(Some(first)));
        assert!(editor.remove(second));
        assert_eq!(editor.selected_id(), Some(first));
    }

    #[test]
    fn patch_deserializes_from_form_json() {
        let patch: ElementPatch = serde_json::from_str(
            r##"{"x": "12", "fontSize": 30, "textAlign": "left", "color": "#fff"}"##,
        )
        .expect("patch should deserialize");
        assert_eq!(patch.x, Some(NumericInput::Text("12".into())));
        assert_eq!(patch.font_size, Some(NumericInput::Number(30.0)));
        assert_eq!(patch.text_align, Some(TextAlign::Left));
        assert_eq!(patch.color.as_deref(), Some("#fff"));
    }
}
