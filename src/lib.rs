//! Certificate template editor.
//!
//! A [`Template`] is a background image plus an ordered list of typed
//! elements. [`TemplateEditor`] places and edits them, [`exporter`] turns the
//! template into its persisted JSON form and back, and [`render()`] binds a
//! template to a [`CertificateInstance`] to produce the finished layer list.

pub mod asset;
pub mod config;
pub mod editor;
pub mod error;
pub mod exporter;
pub mod geometry;
pub mod logging;
pub mod render;
pub mod template;

pub use config::{load_editor_config, EditorConfig};
pub use editor::{EditorError, ElementPatch, PatchReport, TemplateEditor};
pub use error::{AppError, AppResult};
pub use exporter::{read_template, DocumentError, TemplateDocument};
pub use render::{
    render, CertificateInstance, LayerContent, Locale, RenderError, RenderMode, RenderOptions,
    RenderedCertificate,
};
pub use template::{Element, ElementId, ElementKind, Template};
