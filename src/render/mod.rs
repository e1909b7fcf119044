//! Binding resolver and renderer.
//!
//! [`render`] walks the template in z-order and resolves every element against
//! an optional [`CertificateInstance`]. The output is a layer list, not pixels;
//! rasterising a page is left to whoever consumes [`RenderedCertificate`].

mod date;
mod qr;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use date::{format_date, format_issue_date, parse_issue_date, Locale};
pub use qr::{
    is_url_safe, verification_url, DefaultQrEncoder, QrEncoder, QrModules, QUIET_ZONE_MODULES,
};

use crate::asset::AssetRef;
use crate::config::{EditorConfig, DEFAULT_VERIFY_BASE_URL};
use crate::geometry::{CanvasSize, Position};
use crate::template::{Element, ElementContent, ElementId, ElementKind, Template, TextStyle};

pub type RenderResult<T> = std::result::Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template has no background image")]
    MissingBackground,

    #[error("element {element} needs instance field `{field}`")]
    MissingField {
        element: ElementId,
        field: InstanceField,
    },

    #[error("required signature {0} has no image")]
    MissingSignature(ElementId),

    #[error("issue date `{value}` is not an ISO-8601 date")]
    InvalidIssueDate { value: String },

    #[error("certificate id `{value}` cannot be embedded in a URL")]
    InvalidCertificateId { value: String },

    #[error("QR encoding failed: {0}")]
    QrEncoding(String),
}

/// Per-student record bound against a template. Blank values count as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CertificateInstance {
    pub student_name: Option<String>,
    pub course_name: Option<String>,
    pub issue_date: Option<String>,
    pub certificate_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceField {
    StudentName,
    CourseName,
    IssueDate,
    CertificateId,
}

impl InstanceField {
    pub const fn key(self) -> &'static str {
        match self {
            Self::StudentName => "studentName",
            Self::CourseName => "courseName",
            Self::IssueDate => "issueDate",
            Self::CertificateId => "certificateId",
        }
    }
}

impl fmt::Display for InstanceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl CertificateInstance {
    pub fn value(&self, field: InstanceField) -> Option<&str> {
        let raw = match field {
            InstanceField::StudentName => &self.student_name,
            InstanceField::CourseName => &self.course_name,
            InstanceField::IssueDate => &self.issue_date,
            InstanceField::CertificateId => &self.certificate_id,
        };
        raw.as_deref().map(str::trim).filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Design time: unbound fields show placeholders.
    #[default]
    Preview,
    /// Issued certificate: every bound field must resolve.
    Final,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub verify_base_url: String,
    pub locale: Locale,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            verify_base_url: DEFAULT_VERIFY_BASE_URL.to_string(),
            locale: Locale::default(),
        }
    }
}

impl From<&EditorConfig> for RenderOptions {
    fn from(config: &EditorConfig) -> Self {
        Self {
            verify_base_url: config.verify_base_url.clone(),
            locale: config.locale,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LayerContent {
    Text {
        text: String,
    },
    Placeholder {
        label: String,
    },
    QrCode {
        payload: String,
        #[serde(skip)]
        modules: QrModules,
    },
    Signature {
        asset: AssetRef,
    },
    /// Preview stand-in for a signature that has no image yet.
    EmptyBox,
    /// Optional signature without an image in a final render.
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedLayer {
    pub element_id: ElementId,
    pub kind: ElementKind,
    pub position: Position,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<TextStyle>,
    pub content: LayerContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedCertificate {
    pub canvas: CanvasSize,
    pub background: AssetRef,
    pub mode: RenderMode,
    pub layers: Vec<RenderedLayer>,
}

impl RenderedCertificate {
    pub fn layer(&self, id: ElementId) -> Option<&RenderedLayer> {
        self.layers.iter().find(|layer| layer.element_id == id)
    }

    /// Module matrix of the first QR layer, if any resolved to a code.
    pub fn qr_modules(&self) -> Option<&QrModules> {
        self.layers.iter().find_map(|layer| match &layer.content {
            LayerContent::QrCode { modules, .. } => Some(modules),
            _ => None,
        })
    }
}

/// Label shown in place of a bound field that has no value at design time.
pub const fn placeholder_label(kind: ElementKind) -> Option<&'static str> {
    match kind {
        ElementKind::StudentName => Some("[اسم الطالب]"),
        ElementKind::CourseName => Some("[اسم الدورة]"),
        ElementKind::IssueDate => Some("[تاريخ الإصدار]"),
        ElementKind::SerialNumber => Some("[رقم الشهادة]"),
        ElementKind::QrCode => Some("[رمز التحقق]"),
        ElementKind::StaticText | ElementKind::Signature => None,
    }
}

pub fn render(
    template: &Template,
    instance: Option<&CertificateInstance>,
    mode: RenderMode,
    options: &RenderOptions,
) -> RenderResult<RenderedCertificate> {
    render_with(template, instance, mode, options, &DefaultQrEncoder)
}

pub fn render_with(
    template: &Template,
    instance: Option<&CertificateInstance>,
    mode: RenderMode,
    options: &RenderOptions,
    encoder: &dyn QrEncoder,
) -> RenderResult<RenderedCertificate> {
    let background = template
        .background()
        .cloned()
        .ok_or(RenderError::MissingBackground)?;
    let resolver = Resolver {
        instance,
        mode,
        options,
        encoder,
    };
    let layers = template
        .elements()
        .iter()
        .map(|element| {
            Ok(RenderedLayer {
                element_id: element.id,
                kind: element.kind(),
                position: element.position,
                width: element.width,
                height: element.height,
                style: element.style,
                content: resolver.resolve(element)?,
            })
        })
        .collect::<RenderResult<Vec<_>>>()?;

    tracing::info!(?mode, layers = layers.len(), "certificate rendered");
    Ok(RenderedCertificate {
        canvas: template.canvas(),
        background,
        mode,
        layers,
    })
}

/// Resolve one element's displayed content without rendering the rest.
pub fn resolve_content(
    element: &Element,
    instance: Option<&CertificateInstance>,
    mode: RenderMode,
    options: &RenderOptions,
) -> RenderResult<LayerContent> {
    Resolver {
        instance,
        mode,
        options,
        encoder: &DefaultQrEncoder,
    }
    .resolve(element)
}

struct Resolver<'a> {
    instance: Option<&'a CertificateInstance>,
    mode: RenderMode,
    options: &'a RenderOptions,
    encoder: &'a dyn QrEncoder,
}

impl Resolver<'_> {
    fn resolve(&self, element: &Element) -> RenderResult<LayerContent> {
        match &element.content {
            ElementContent::StaticText { text } => Ok(LayerContent::Text { text: text.clone() }),
            ElementContent::StudentName => {
                self.bound(element, InstanceField::StudentName, |value| {
                    Ok(LayerContent::Text {
                        text: value.to_string(),
                    })
                })
            }
            ElementContent::CourseName => self.bound(element, InstanceField::CourseName, |value| {
                Ok(LayerContent::Text {
                    text: value.to_string(),
                })
            }),
            ElementContent::IssueDate => self.bound(element, InstanceField::IssueDate, |value| {
                format_issue_date(value, self.options.locale).map(|text| LayerContent::Text { text })
            }),
            ElementContent::SerialNumber => {
                self.bound(element, InstanceField::CertificateId, |value| {
                    Ok(LayerContent::Text {
                        text: value.to_string(),
                    })
                })
            }
            ElementContent::QrCode => {
                self.bound(element, InstanceField::CertificateId, |value| self.qr(value))
            }
            ElementContent::Signature { asset, required } => match (asset, self.mode) {
                (Some(asset), _) => Ok(LayerContent::Signature {
                    asset: asset.clone(),
                }),
                (None, RenderMode::Preview) => Ok(LayerContent::EmptyBox),
                (None, RenderMode::Final) if *required => {
                    Err(RenderError::MissingSignature(element.id))
                }
                (None, RenderMode::Final) => Ok(LayerContent::Blank),
            },
        }
    }

    /// Look up `field` and format it. In preview a missing or unusable value
    /// falls back to the kind's placeholder; in final mode it aborts.
    fn bound(
        &self,
        element: &Element,
        field: InstanceField,
        format: impl FnOnce(&str) -> RenderResult<LayerContent>,
    ) -> RenderResult<LayerContent> {
        let resolved = match self.instance.and_then(|instance| instance.value(field)) {
            Some(value) => format(value),
            None => Err(RenderError::MissingField {
                element: element.id,
                field,
            }),
        };
        match (resolved, self.mode) {
            (Ok(content), _) => Ok(content),
            (Err(err), RenderMode::Final) => Err(err),
            (Err(err), RenderMode::Preview) => {
                if !matches!(err, RenderError::MissingField { .. }) {
                    tracing::warn!(id = %element.id, error = %err, "showing placeholder");
                }
                Ok(placeholder(element.kind()))
            }
        }
    }

    fn qr(&self, certificate_id: &str) -> RenderResult<LayerContent> {
        if !is_url_safe(certificate_id) {
            return Err(RenderError::InvalidCertificateId {
                value: certificate_id.to_string(),
            });
        }
        let payload = verification_url(&self.options.verify_base_url, certificate_id);
        let modules = self.encoder.encode(&payload)?;
        Ok(LayerContent::QrCode { payload, modules })
    }
}

fn placeholder(kind: ElementKind) -> LayerContent {
    LayerContent::Placeholder {
        label: placeholder_label(kind).unwrap_or_default().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::TemplateEditor;
    use pretty_assertions::assert_eq;

    const BASE_URL: &str = "https://academy.example";

    fn options() -> RenderOptions {
        RenderOptions {
            verify_base_url: BASE_URL.to_string(),
            locale: Locale::Arabic,
        }
    }

    fn instance() -> CertificateInstance {
        CertificateInstance {
            student_name: Some("أحمد".to_string()),
            course_name: Some("الخط الديواني".to_string()),
            issue_date: Some("2025-01-01".to_string()),
            certificate_id: Some("ABC123".to_string()),
        }
    }

    /// One element of every kind over a ready background.
    fn every_kind() -> (TemplateEditor, Vec<ElementId>) {
        let mut editor = TemplateEditor::default();
        editor.begin_background_upload();
        editor.complete_background_upload("bg.png");
        let ids = ElementKind::ALL
            .iter()
            .map(|kind| editor.create_element(*kind))
            .collect::<Vec<_>>();
        let signature = ids[ElementKind::ALL
            .iter()
            .position(|kind| *kind == ElementKind::Signature)
            .expect("signature kind listed")];
        editor.begin_signature_upload(signature);
        editor.complete_signature_upload(signature, "sig.png");
        (editor, ids)
    }

    fn content(rendered: &RenderedCertificate, id: ElementId) -> &LayerContent {
        &rendered.layer(id).expect("layer for element").content
    }

    #[test]
    fn final_render_binds_every_kind() {
        let (editor, _) = every_kind();
        let rendered = render(editor.template(), Some(&instance()), RenderMode::Final, &options())
            .expect("complete instance should render");

        let resolved = rendered
            .layers
            .iter()
            .map(|layer| match &layer.content {
                LayerContent::Text { text } => text.clone(),
                LayerContent::QrCode { payload, .. } => payload.clone(),
                LayerContent::Signature { asset } => asset.as_str().to_string(),
                other => panic!("unexpected layer content {other:?}"),
            })
            .collect::<Vec<_>>();
        let expected = ElementKind::ALL
            .iter()
            .map(|kind| match kind {
                ElementKind::StaticText => String::new(),
                ElementKind::StudentName => "أحمد".to_string(),
                ElementKind::CourseName => "الخط الديواني".to_string(),
                ElementKind::IssueDate => "١ يناير ٢٠٢٥".to_string(),
                ElementKind::SerialNumber => "ABC123".to_string(),
                ElementKind::QrCode => format!("{BASE_URL}/verify/ABC123"),
                ElementKind::Signature => "sig.png".to_string(),
            })
            .collect::<Vec<_>>();
        assert_eq!(resolved, expected);
        assert!(rendered.qr_modules().is_some());
    }

    #[test]
    fn layers_follow_insertion_order() {
        let (editor, ids) = every_kind();
        let rendered = editor.preview(&options()).expect("preview should render");
        let order = rendered
            .layers
            .iter()
            .map(|layer| layer.element_id)
            .collect::<Vec<_>>();
        assert_eq!(order, ids);
    }

    #[test]
    fn final_render_without_certificate_id_fails_but_preview_shows_placeholder() {
        let (editor, ids) = every_kind();
        let serial = ids[4];
        let partial = CertificateInstance {
            certificate_id: None,
            ..instance()
        };

        let err = render(editor.template(), Some(&partial), RenderMode::Final, &options())
            .expect_err("missing certificate id should abort");
        assert!(matches!(
            err,
            RenderError::MissingField {
                field: InstanceField::CertificateId,
                ..
            }
        ));

        let preview = render(editor.template(), Some(&partial), RenderMode::Preview, &options())
            .expect("preview tolerates gaps");
        assert_eq!(
            content(&preview, serial),
            &LayerContent::Placeholder {
                label: "[رقم الشهادة]".to_string()
            }
        );
        assert_eq!(
            content(&preview, ids[1]),
            &LayerContent::Text {
                text: "أحمد".to_string()
            }
        );
    }

    #[test]
    fn preview_without_instance_uses_placeholders() {
        let (editor, ids) = every_kind();
        let preview = editor.preview(&options()).expect("preview should render");
        for (kind, id) in ElementKind::ALL.iter().zip(&ids) {
            if let Some(label) = placeholder_label(*kind) {
                assert_eq!(
                    content(&preview, *id),
                    &LayerContent::Placeholder {
                        label: label.to_string()
                    }
                );
            }
        }
    }

    #[test]
    fn blank_instance_values_count_as_missing() {
        let (editor, _) = every_kind();
        let blank = CertificateInstance {
            student_name: Some("   ".to_string()),
            ..instance()
        };
        let err = render(editor.template(), Some(&blank), RenderMode::Final, &options())
            .expect_err("blank name should abort");
        assert!(matches!(
            err,
            RenderError::MissingField {
                field: InstanceField::StudentName,
                ..
            }
        ));
    }

    #[test]
    fn missing_background_blocks_both_modes() {
        let mut editor = TemplateEditor::default();
        editor.create_element(ElementKind::StudentName);
        for mode in [RenderMode::Preview, RenderMode::Final] {
            let err = render(editor.template(), Some(&instance()), mode, &options())
                .expect_err("draft should not render");
            assert!(matches!(err, RenderError::MissingBackground));
        }
    }

    #[test]
    fn signature_without_image_depends_on_mode_and_required_flag() {
        let mut editor = TemplateEditor::default();
        editor.begin_background_upload();
        editor.complete_background_upload("bg.png");
        let optional = editor.create_element(ElementKind::Signature);
        let required = editor.create_element(ElementKind::Signature);
        editor.update(required, crate::editor::ElementPatch::new().required(true));

        let preview = render(editor.template(), None, RenderMode::Preview, &options())
            .expect("preview should render");
        assert_eq!(content(&preview, optional), &LayerContent::EmptyBox);
        assert_eq!(content(&preview, required), &LayerContent::EmptyBox);

        let err = render(editor.template(), Some(&instance()), RenderMode::Final, &options())
            .expect_err("required signature should abort");
        assert!(matches!(err, RenderError::MissingSignature(id) if id == required));

        editor.update(required, crate::editor::ElementPatch::new().required(false));
        let rendered = render(editor.template(), Some(&instance()), RenderMode::Final, &options())
            .expect("optional signatures render blank");
        assert_eq!(content(&rendered, optional), &LayerContent::Blank);
        assert_eq!(content(&rendered, required), &LayerContent::Blank);
    }

    #[test]
    fn unsafe_certificate_id_aborts_final_render() {
        let (editor, ids) = every_kind();
        let unsafe_id = CertificateInstance {
            certificate_id: Some("ABC 123/x".to_string()),
            ..instance()
        };
        let err = render(editor.template(), Some(&unsafe_id), RenderMode::Final, &options())
            .expect_err("unsafe id should abort");
        assert!(matches!(err, RenderError::InvalidCertificateId { .. }));

        let preview = render(editor.template(), Some(&unsafe_id), RenderMode::Preview, &options())
            .expect("preview falls back to a placeholder");
        assert_eq!(
            content(&preview, ids[5]),
            &LayerContent::Placeholder {
                label: "[رمز التحقق]".to_string()
            }
        );
    }

    #[test]
    fn invalid_issue_date_aborts_final_render() {
        let (editor, _) = every_kind();
        let bad_date = CertificateInstance {
            issue_date: Some("next week".to_string()),
            ..instance()
        };
        let err = render(editor.template(), Some(&bad_date), RenderMode::Final, &options())
            .expect_err("bad date should abort");
        assert!(matches!(err, RenderError::InvalidIssueDate { .. }));
    }

    #[test]
    fn english_locale_formats_dates_in_english() {
        let (editor, ids) = every_kind();
        let options = RenderOptions {
            locale: Locale::English,
            ..options()
        };
        let rendered = render(editor.template(), Some(&instance()), RenderMode::Final, &options)
            .expect("instance should render");
        assert_eq!(
            content(&rendered, ids[3]),
            &LayerContent::Text {
                text: "January 1, 2025".to_string()
            }
        );
    }

    #[test]
    fn custom_encoder_is_used_for_qr_layers() {
        struct Fixed;
        impl QrEncoder for Fixed {
            fn encode(&self, _payload: &str) -> RenderResult<QrModules> {
                Ok(QrModules::new(1, vec![true]).expect("1x1 matrix"))
            }
        }

        let (editor, _) = every_kind();
        let rendered = render_with(
            editor.template(),
            Some(&instance()),
            RenderMode::Final,
            &options(),
            &Fixed,
        )
        .expect("instance should render");
        assert_eq!(rendered.qr_modules().map(QrModules::width), Some(1));
    }

    #[test]
    fn rendered_layers_serialize_with_kind_tags() {
        let (editor, _) = every_kind();
        let rendered = editor.preview(&options()).expect("preview should render");
        let json = serde_json::to_value(&rendered).expect("rendered certificate serializes");
        assert_eq!(json["mode"], "preview");
        assert_eq!(json["background"], "bg.png");
        assert_eq!(json["layers"][1]["kind"], "studentName");
        assert_eq!(json["layers"][1]["content"]["kind"], "placeholder");
        assert_eq!(json["layers"][6]["content"]["kind"], "signature");
    }
}
