//! Live editing session over one template.
//!
//! [`TemplateEditor`] is the single writer: the toolbox, canvas controller,
//! property editor and asset flows are all methods on it, split across the
//! submodules by concern.

mod assets;
mod canvas;
mod properties;
mod toolbox;

use std::collections::HashMap;

use thiserror::Error;

pub use canvas::{CanvasController, DragGesture};
pub use properties::{ElementPatch, NumericInput, PatchReport};

use crate::asset::{AssetSlot, AssetState};
use crate::config::EditorConfig;
use crate::exporter::{self, DocumentError, TemplateDocument};
use crate::geometry::CanvasSize;
use crate::render::{
    self, CertificateInstance, RenderError, RenderMode, RenderOptions, RenderedCertificate,
};
use crate::template::{Element, ElementContent, ElementId, Template};

pub const DEFAULT_CASCADE_STEP: i32 = 20;

pub type EditorResult<T> = std::result::Result<T, EditorError>;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("template is a draft: no background image")]
    MissingBackground,

    #[error("asset upload still pending for {target}")]
    AssetPending { target: String },

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

#[derive(Debug, Clone)]
pub struct TemplateEditor {
    template: Template,
    canvas: CanvasController,
    background: AssetSlot,
    signatures: HashMap<ElementId, AssetSlot>,
    next_id: u64,
    cascade_step: i32,
}

impl Default for TemplateEditor {
    fn default() -> Self {
        Self::new(CanvasSize::default())
    }
}

impl TemplateEditor {
    pub fn new(canvas: CanvasSize) -> Self {
        Self::from_template(Template::new(canvas))
    }

    pub fn with_config(config: &EditorConfig) -> Self {
        let mut editor = Self::new(config.canvas_size());
        editor.cascade_step = config.cascade_step;
        editor
    }

    /// Start a session on an existing template (e.g. one just deserialized).
    pub fn from_template(template: Template) -> Self {
        let mut editor = Self {
            template: Template::default(),
            canvas: CanvasController::default(),
            background: AssetSlot::new(),
            signatures: HashMap::new(),
            next_id: 1,
            cascade_step: DEFAULT_CASCADE_STEP,
        };
        editor.replace_template(template);
        editor
    }

    fn allocate_id(&mut self) -> ElementId {
        while self.template.contains(ElementId::new(self.next_id)) {
            self.next_id = self.next_id.saturating_add(1);
        }
        let id = ElementId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Swap in a whole template. Selection and gestures reset; asset slots are
    /// rebuilt from the stored references; ids resume past the largest one.
    pub fn replace_template(&mut self, template: Template) {
        self.background = AssetSlot::from_ref(template.background().cloned());
        self.signatures = template
            .elements()
            .iter()
            .filter_map(|element| match &element.content {
                ElementContent::Signature { asset, .. } => {
                    Some((element.id, AssetSlot::from_ref(asset.clone())))
                }
                _ => None,
            })
            .collect();
        self.next_id = template
            .max_id()
            .map(ElementId::get)
            .unwrap_or(0)
            .saturating_add(1);
        self.canvas = CanvasController::default();
        self.template = template;
        tracing::info!(
            elements = self.template.len(),
            draft = self.template.is_draft(),
            "template loaded"
        );
    }

    pub fn load(&mut self, document: TemplateDocument) -> EditorResult<()> {
        let template = exporter::deserialize(document)?;
        self.replace_template(template);
        Ok(())
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn controller(&self) -> &CanvasController {
        &self.canvas
    }

    pub fn selected_id(&self) -> Option<ElementId> {
        self.canvas.selected()
    }

    pub fn selected(&self) -> Option<&Element> {
        self.canvas
            .selected()
            .and_then(|id| self.template.element(id))
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.template.element(id)
    }

    pub fn background_state(&self) -> &AssetState {
        self.background.state()
    }

    pub fn signature_state(&self, id: ElementId) -> Option<&AssetState> {
        self.signatures.get(&id).map(AssetSlot::state)
    }

    pub(crate) fn is_asset_pending(&self, id: ElementId) -> bool {
        self.signatures
            .get(&id)
            .is_some_and(AssetSlot::is_pending)
    }

    fn ensure_settled(&self) -> EditorResult<()> {
        if self.background.is_pending() {
            return Err(EditorError::AssetPending {
                target: "background".to_string(),
            });
        }
        if let Some((id, _)) = self.signatures.iter().find(|(_, slot)| slot.is_pending()) {
            return Err(EditorError::AssetPending {
                target: id.to_string(),
            });
        }
        if self.template.is_draft() {
            return Err(EditorError::MissingBackground);
        }
        Ok(())
    }

    /// Persistable form of the whole template. Drafts and in-flight uploads block it.
    pub fn export(&self) -> EditorResult<TemplateDocument> {
        self.ensure_settled()?;
        let document = exporter::serialize(&self.template);
        tracing::info!(elements = document.elements.len(), "template exported");
        Ok(document)
    }

    pub fn render(
        &self,
        instance: Option<&CertificateInstance>,
        mode: RenderMode,
        options: &RenderOptions,
    ) -> EditorResult<RenderedCertificate> {
        self.ensure_settled()?;
        Ok(render::render(&self.template, instance, mode, options)?)
    }

    /// Design-time view of the canvas with placeholders for bound fields.
    pub fn preview(&self, options: &RenderOptions) -> EditorResult<RenderedCertificate> {
        self.render(None, RenderMode::Preview, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetRef;
    use crate::template::ElementKind;

    fn asset(name: &str) -> AssetRef {
        AssetRef::new(name).expect("non-empty reference")
    }

    #[test]
    fn export_is_blocked_for_drafts() {
        let mut editor = TemplateEditor::default();
        editor.create_element(ElementKind::StudentName);
        let err = editor.export().expect_err("draft should not export");
        assert!(matches!(err, EditorError::MissingBackground));
    }

    #[test]
    fn config_sets_canvas_and_cascade_step() {
        let config = EditorConfig {
            canvas_width: 400,
            canvas_height: 300,
            cascade_step: 35,
            ..EditorConfig::default()
        };
        let mut editor = TemplateEditor::with_config(&config);
        assert_eq!(editor.template().canvas(), CanvasSize::new(400, 300));
        editor.create_element(ElementKind::StudentName);
        let second = editor.create_element(ElementKind::StudentName);
        assert_eq!(
            editor.element(second).map(|element| element.position),
            Some(crate::geometry::Position::new(35, 35))
        );
    }

    #[test]
    fn export_is_blocked_while_background_uploads() {
        let mut editor = TemplateEditor::default();
        editor.begin_background_upload();
        let err = editor.export().expect_err("pending upload should block export");
        assert!(matches!(err, EditorError::AssetPending { ref target } if target == "background"));

        editor.complete_background_upload("bg.png");
        let document = editor.export().expect("ready background should export");
        assert_eq!(document.background_image.as_deref(), Some("bg.png"));
    }

    #[test]
    fn loaded_template_resumes_ids_past_existing_ones() {
        let mut source = TemplateEditor::default();
        source.complete_background_upload_direct("bg.png");
        for _ in 0..3 {
            source.create_element(ElementKind::CourseName);
        }
        let document = source.export().expect("export should succeed");

        let mut editor = TemplateEditor::default();
        editor.load(document).expect("load should succeed");
        let id = editor.create_element(ElementKind::SerialNumber);
        assert_eq!(id, ElementId::new(4));
        assert_eq!(editor.selected_id(), Some(id));
    }

    #[test]
    fn load_resets_selection_and_rebuilds_signature_slots() {
        let mut source = TemplateEditor::default();
        source.complete_background_upload_direct("bg.png");
        let signature = source.create_element(ElementKind::Signature);
        source.complete_signature_upload_direct(signature, "sig.png");
        let document = source.export().expect("export should succeed");

        let mut editor = TemplateEditor::default();
        let stray = editor.create_element(ElementKind::QrCode);
        assert_eq!(editor.selected_id(), Some(stray));
        editor.load(document).expect("load should succeed");

        assert_eq!(editor.selected_id(), None);
        assert_eq!(
            editor.signature_state(signature),
            Some(&AssetState::Ready(asset("sig.png")))
        );
    }

    impl TemplateEditor {
        fn complete_background_upload_direct(&mut self, reference: &str) {
            self.begin_background_upload();
            self.complete_background_upload(reference);
        }

        fn complete_signature_upload_direct(&mut self, id: ElementId, reference: &str) {
            assert!(self.begin_signature_upload(id));
            assert!(self.complete_signature_upload(id, reference));
        }
    }
}
