//! Persisted form of a template.
//!
//! [`serialize`] and [`deserialize`] are exact inverses for every template the
//! editor can produce. The JSON layout uses camelCase keys and a `type` tag per
//! element so it can be stored and read by the rest of the site unchanged.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::asset::AssetRef;
use crate::geometry::{CanvasSize, Color, Position};
use crate::template::element::clamp_width;
use crate::template::style::clamp_font_size;
use crate::template::{
    Element, ElementContent, ElementId, ElementKind, FontFamily, FontStyle, FontWeight,
    Template, TextAlign, TextStyle, DEFAULT_QR_SIZE, DEFAULT_SIGNATURE_WIDTH,
};

pub type DocumentResult<T> = std::result::Result<T, DocumentError>;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid template json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read template: {0}")]
    Io(#[from] std::io::Error),

    #[error("canvas size must be non-zero, got {width}x{height}")]
    EmptyCanvas { width: u32, height: u32 },

    #[error("duplicate element id {0}")]
    DuplicateElementId(ElementId),

    #[error("element {id} has malformed color {value:?}")]
    MalformedColor { id: ElementId, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDocument {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Missing or blank means the template is still a draft.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_blank_as_none"
    )]
    pub background_image: Option<String>,
    #[serde(default)]
    pub elements: Vec<ElementRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementRecord {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(deserialize_with = "deserialize_coordinate")]
    pub x: i32,
    #[serde(deserialize_with = "deserialize_coordinate")]
    pub y: i32,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_measure"
    )]
    pub width: Option<u32>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_measure"
    )]
    pub height: Option<u32>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_measure"
    )]
    pub font_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<FontFamily>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<FontStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_blank_as_none"
    )]
    pub signature_asset: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
}

fn deserialize_blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|value| !value.trim().is_empty()))
}

/// Browsers hand back fractional offsets; they are rounded to whole pixels.
fn deserialize_coordinate<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Err(serde::de::Error::custom("coordinate must be a finite number"));
    }
    Ok(value.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32)
}

/// Sizes go through the same rounding as coordinates. Negative values become
/// zero here and are raised to each field's minimum when the element is built.
fn deserialize_measure<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<f64>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if !value.is_finite() {
        return Err(serde::de::Error::custom("size must be a finite number"));
    }
    Ok(Some(value.round().clamp(0.0, f64::from(u32::MAX)) as u32))
}

pub fn serialize(template: &Template) -> TemplateDocument {
    let canvas = template.canvas();
    TemplateDocument {
        canvas_width: canvas.width,
        canvas_height: canvas.height,
        background_image: template.background().map(|asset| asset.as_str().to_string()),
        elements: template.elements().iter().map(element_record).collect(),
    }
}

fn element_record(element: &Element) -> ElementRecord {
    let style = element.style;
    let (content, signature_asset, required) = match &element.content {
        ElementContent::StaticText { text } => (Some(text.clone()), None, false),
        ElementContent::Signature { asset, required } => (
            None,
            asset.as_ref().map(|asset| asset.as_str().to_string()),
            *required,
        ),
        ElementContent::StudentName
        | ElementContent::CourseName
        | ElementContent::IssueDate
        | ElementContent::SerialNumber
        | ElementContent::QrCode => (None, None, false),
    };
    ElementRecord {
        id: element.id,
        kind: element.kind(),
        x: element.position.x,
        y: element.position.y,
        width: element.width,
        height: element.height,
        font_size: style.map(|style| u32::from(style.font_size)),
        color: style.map(|style| style.color.to_hex()),
        font_family: style.map(|style| style.font_family),
        font_weight: style.map(|style| style.font_weight),
        font_style: style.map(|style| style.font_style),
        text_align: style.map(|style| style.text_align),
        content,
        signature_asset,
        required,
    }
}

pub fn deserialize(document: TemplateDocument) -> DocumentResult<Template> {
    let canvas = CanvasSize::new(document.canvas_width, document.canvas_height);
    if canvas.is_empty() {
        return Err(DocumentError::EmptyCanvas {
            width: canvas.width,
            height: canvas.height,
        });
    }

    let mut template = Template::new(canvas);
    template.set_background(document.background_image.and_then(AssetRef::new));
    for record in document.elements {
        let element = element_from_record(record)?;
        template
            .push(element)
            .map_err(|element| DocumentError::DuplicateElementId(element.id))?;
    }
    Ok(template)
}

fn element_from_record(record: ElementRecord) -> DocumentResult<Element> {
    let kind = record.kind;
    let mut element = Element::new(record.id, kind, Position::new(record.x, record.y));

    match kind {
        ElementKind::QrCode => {
            let side = record
                .width
                .or(record.height)
                .unwrap_or(DEFAULT_QR_SIZE);
            element.set_width(f64::from(side));
        }
        ElementKind::Signature => {
            element.width = Some(clamp_width(f64::from(
                record.width.unwrap_or(DEFAULT_SIGNATURE_WIDTH),
            )));
        }
        _ => {
            element.width = record.width.map(|width| clamp_width(f64::from(width)));
        }
    }

    if let Some(style) = element.style.as_mut() {
        *style = text_style(&record)?;
    }

    element.content = match element.content {
        ElementContent::StaticText { .. } => ElementContent::StaticText {
            text: record.content.unwrap_or_default(),
        },
        ElementContent::Signature { .. } => ElementContent::Signature {
            asset: record.signature_asset.and_then(AssetRef::new),
            required: record.required,
        },
        other => other,
    };
    Ok(element)
}

fn text_style(record: &ElementRecord) -> DocumentResult<TextStyle> {
    let defaults = TextStyle::default();
    let color = match record.color.as_deref() {
        Some(raw) => Color::parse_hex(raw).ok_or_else(|| DocumentError::MalformedColor {
            id: record.id,
            value: raw.to_string(),
        })?,
        None => defaults.color,
    };
    Ok(TextStyle {
        font_size: record
            .font_size
            .map_or(defaults.font_size, |size| clamp_font_size(f64::from(size))),
        color,
        font_family: record.font_family.unwrap_or(defaults.font_family),
        font_weight: record.font_weight.unwrap_or(defaults.font_weight),
        font_style: record.font_style.unwrap_or(defaults.font_style),
        text_align: record.text_align.unwrap_or(defaults.text_align),
    })
}

pub fn to_json(template: &Template) -> DocumentResult<String> {
    Ok(serde_json::to_string_pretty(&serialize(template))?)
}

pub fn from_json(json: &str) -> DocumentResult<Template> {
    let document: TemplateDocument = serde_json::from_str(json)?;
    deserialize(document)
}

/// Read and validate a persisted template file.
pub fn read_template(path: &Path) -> DocumentResult<Template> {
    let json = std::fs::read_to_string(path)?;
    let template = from_json(&json)?;
    tracing::debug!(path = %path.display(), elements = template.len(), "template read");
    Ok(template)
}
