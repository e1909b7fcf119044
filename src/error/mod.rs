use crate::asset::AssetError;
use crate::editor::EditorError;
use crate::exporter::DocumentError;
use crate::render::RenderError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Asset(#[from] AssetError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::TemplateEditor;
    use crate::exporter;
    use crate::render::{RenderMode, RenderOptions};

    fn export_then_render(editor: &TemplateEditor) -> AppResult<()> {
        let document = editor.export()?;
        let template = exporter::deserialize(document)?;
        crate::render::render(&template, None, RenderMode::Final, &RenderOptions::default())?;
        Ok(())
    }

    #[test]
    fn module_errors_convert_into_app_error() {
        let draft = TemplateEditor::default();
        assert!(matches!(export_then_render(&draft), Err(AppError::Editor(_))));

        let document = exporter::from_json(r#"{"canvasWidth": 0, "canvasHeight": 1}"#)
            .map_err(AppError::from);
        assert!(matches!(document, Err(AppError::Document(_))));
    }
}
