use std::fmt;

use serde::{Deserialize, Serialize};

use super::style::TextStyle;
use crate::asset::AssetRef;
use crate::geometry::{clamp_axis, CanvasSize, Position};

pub const WIDTH_MIN: u32 = 20;
pub const WIDTH_MAX: u32 = 500;
pub const DEFAULT_QR_SIZE: u32 = 100;
pub const DEFAULT_SIGNATURE_WIDTH: u32 = 150;

/// Unique within one template; never reused by the allocating editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(u64);

impl ElementId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "el-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementKind {
    StaticText,
    StudentName,
    CourseName,
    IssueDate,
    SerialNumber,
    QrCode,
    Signature,
}

impl ElementKind {
    pub const ALL: [ElementKind; 7] = [
        Self::StaticText,
        Self::StudentName,
        Self::CourseName,
        Self::IssueDate,
        Self::SerialNumber,
        Self::QrCode,
        Self::Signature,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::StaticText => "Text",
            Self::StudentName => "Student name",
            Self::CourseName => "Course name",
            Self::IssueDate => "Issue date",
            Self::SerialNumber => "Serial number",
            Self::QrCode => "QR code",
            Self::Signature => "Signature",
        }
    }

    pub const fn is_text_like(self) -> bool {
        matches!(
            self,
            Self::StaticText
                | Self::StudentName
                | Self::CourseName
                | Self::IssueDate
                | Self::SerialNumber
        )
    }

    /// Whether the property editor accepts `field` for this kind.
    pub const fn supports(self, field: ElementField) -> bool {
        match field {
            ElementField::X | ElementField::Y | ElementField::Width => true,
            ElementField::FontSize
            | ElementField::Color
            | ElementField::FontFamily
            | ElementField::FontWeight
            | ElementField::FontStyle
            | ElementField::TextAlign => self.is_text_like(),
            ElementField::Content => matches!(self, Self::StaticText),
            ElementField::Required => matches!(self, Self::Signature),
        }
    }
}

/// Editable attributes, used to report what a property update did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementField {
    X,
    Y,
    Width,
    FontSize,
    Color,
    FontFamily,
    FontWeight,
    FontStyle,
    TextAlign,
    Content,
    Required,
}

/// Kind-specific payload. The variant is the element's type tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementContent {
    StaticText { text: String },
    StudentName,
    CourseName,
    IssueDate,
    SerialNumber,
    QrCode,
    Signature {
        asset: Option<AssetRef>,
        /// Final renders fail instead of leaving a blank when unset.
        required: bool,
    },
}

impl ElementContent {
    pub fn for_kind(kind: ElementKind) -> Self {
        match kind {
            ElementKind::StaticText => Self::StaticText {
                text: String::new(),
            },
            ElementKind::StudentName => Self::StudentName,
            ElementKind::CourseName => Self::CourseName,
            ElementKind::IssueDate => Self::IssueDate,
            ElementKind::SerialNumber => Self::SerialNumber,
            ElementKind::QrCode => Self::QrCode,
            ElementKind::Signature => Self::Signature {
                asset: None,
                required: false,
            },
        }
    }

    pub const fn kind(&self) -> ElementKind {
        match self {
            Self::StaticText { .. } => ElementKind::StaticText,
            Self::StudentName => ElementKind::StudentName,
            Self::CourseName => ElementKind::CourseName,
            Self::IssueDate => ElementKind::IssueDate,
            Self::SerialNumber => ElementKind::SerialNumber,
            Self::QrCode => ElementKind::QrCode,
            Self::Signature { .. } => ElementKind::Signature,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub id: ElementId,
    pub position: Position,
    /// `None` for auto-sized text.
    pub width: Option<u32>,
    /// Only determinate for square QR codes; text and signatures size themselves.
    pub height: Option<u32>,
    /// `Some` exactly for text-like kinds.
    pub style: Option<TextStyle>,
    pub content: ElementContent,
}

impl Element {
    /// A fresh element with the defaults for `kind`.
    pub fn new(id: ElementId, kind: ElementKind, position: Position) -> Self {
        let (width, height) = match kind {
            ElementKind::QrCode => (Some(DEFAULT_QR_SIZE), Some(DEFAULT_QR_SIZE)),
            ElementKind::Signature => (Some(DEFAULT_SIGNATURE_WIDTH), None),
            _ => (None, None),
        };
        Self {
            id,
            position,
            width,
            height,
            style: kind.is_text_like().then(TextStyle::default),
            content: ElementContent::for_kind(kind),
        }
    }

    pub fn static_text(id: ElementId, position: Position, text: impl Into<String>) -> Self {
        let mut element = Self::new(id, ElementKind::StaticText, position);
        element.content = ElementContent::StaticText { text: text.into() };
        element
    }

    pub const fn kind(&self) -> ElementKind {
        self.content.kind()
    }

    pub fn text(&self) -> Option<&str> {
        match &self.content {
            ElementContent::StaticText { text } => Some(text),
            _ => None,
        }
    }

    pub fn signature_asset(&self) -> Option<&AssetRef> {
        match &self.content {
            ElementContent::Signature { asset, .. } => asset.as_ref(),
            _ => None,
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self.content, ElementContent::Signature { required: true, .. })
    }

    /// Apply a clamped width, keeping QR codes square.
    pub fn set_width(&mut self, width: f64) {
        let width = clamp_width(width);
        self.width = Some(width);
        if self.kind() == ElementKind::QrCode {
            self.height = Some(width);
        }
    }

    pub(crate) fn set_signature_asset(&mut self, reference: Option<AssetRef>) {
        if let ElementContent::Signature { asset, .. } = &mut self.content {
            *asset = reference;
        }
    }

    /// Pull the position back so the determinate part of the box fits `canvas`.
    pub fn clamp_into(&mut self, canvas: CanvasSize) {
        self.position = Position::new(
            clamp_axis(self.position.x, self.width, canvas.width),
            clamp_axis(self.position.y, self.height, canvas.height),
        );
    }
}

pub(crate) fn clamp_width(width: f64) -> u32 {
    let width = width.round();
    if width <= f64::from(WIDTH_MIN) {
        WIDTH_MIN
    } else if width >= f64::from(WIDTH_MAX) {
        WIDTH_MAX
    } else {
        width as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_like_kinds_get_style_and_no_size() {
        for kind in ElementKind::ALL.into_iter().filter(|kind| kind.is_text_like()) {
            let element = Element::new(ElementId::new(1), kind, Position::origin());
            assert_eq!(element.style, Some(TextStyle::default()), "{kind:?}");
            assert_eq!(element.width, None, "{kind:?}");
            assert_eq!(element.height, None, "{kind:?}");
        }
    }

    #[test]
    fn qr_and_signature_defaults() {
        let qr = Element::new(ElementId::new(1), ElementKind::QrCode, Position::origin());
        assert_eq!((qr.width, qr.height), (Some(100), Some(100)));
        assert_eq!(qr.style, None);

        let signature = Element::new(ElementId::new(2), ElementKind::Signature, Position::origin());
        assert_eq!((signature.width, signature.height), (Some(150), None));
        assert_eq!(signature.signature_asset(), None);
        assert!(!signature.is_required());
    }

    #[test]
    fn qr_width_keeps_square() {
        let mut qr = Element::new(ElementId::new(1), ElementKind::QrCode, Position::origin());
        qr.set_width(1000.0);
        assert_eq!((qr.width, qr.height), (Some(WIDTH_MAX), Some(WIDTH_MAX)));
        qr.set_width(3.0);
        assert_eq!((qr.width, qr.height), (Some(WIDTH_MIN), Some(WIDTH_MIN)));
    }

    #[test]
    fn content_and_required_are_kind_specific() {
        assert!(ElementKind::StaticText.supports(ElementField::Content));
        assert!(!ElementKind::QrCode.supports(ElementField::Content));
        assert!(!ElementKind::QrCode.supports(ElementField::FontSize));
        assert!(ElementKind::Signature.supports(ElementField::Required));
        assert!(ElementKind::IssueDate.supports(ElementField::TextAlign));
    }

    #[test]
    fn clamp_into_only_limits_determinate_axes() {
        let canvas = CanvasSize::new(842, 595);
        let mut signature =
            Element::new(ElementId::new(1), ElementKind::Signature, Position::new(900, 900));
        signature.clamp_into(canvas);
        assert_eq!(signature.position, Position::new(692, 900));
    }
}
