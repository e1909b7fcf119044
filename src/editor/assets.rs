use super::*;
use crate::asset::{AssetEvent, AssetRef};

impl TemplateEditor {
    pub fn begin_background_upload(&mut self) -> bool {
        if self.background.transition(AssetEvent::BeginUpload).is_err() {
            return false;
        }
        self.template.set_background(None);
        true
    }

    /// Finish the pending background upload. A blank reference counts as a failure.
    pub fn complete_background_upload(&mut self, reference: &str) -> bool {
        let event = match AssetRef::new(reference) {
            Some(reference) => AssetEvent::Complete(reference),
            None => {
                tracing::warn!("upload returned an empty background reference");
                AssetEvent::Fail
            }
        };
        let completed = matches!(event, AssetEvent::Complete(_));
        match self.background.transition(event) {
            Ok(held) => {
                self.template.set_background(held);
                completed
            }
            Err(_) => false,
        }
    }

    pub fn fail_background_upload(&mut self) -> bool {
        match self.background.transition(AssetEvent::Fail) {
            Ok(held) => {
                self.template.set_background(held);
                true
            }
            Err(_) => false,
        }
    }

    pub fn clear_background(&mut self) -> bool {
        match self.background.transition(AssetEvent::Clear) {
            Ok(held) => {
                self.template.set_background(held);
                true
            }
            Err(_) => false,
        }
    }

    /// Mark a signature element as waiting on its image. Until the upload
    /// settles the element refuses width changes and drags.
    pub fn begin_signature_upload(&mut self, id: ElementId) -> bool {
        self.transition_signature(id, AssetEvent::BeginUpload)
    }

    pub fn complete_signature_upload(&mut self, id: ElementId, reference: &str) -> bool {
        match AssetRef::new(reference) {
            Some(reference) => self.transition_signature(id, AssetEvent::Complete(reference)),
            None => {
                tracing::warn!(%id, "upload returned an empty signature reference");
                self.transition_signature(id, AssetEvent::Fail);
                false
            }
        }
    }

    pub fn fail_signature_upload(&mut self, id: ElementId) -> bool {
        self.transition_signature(id, AssetEvent::Fail)
    }

    pub fn clear_signature(&mut self, id: ElementId) -> bool {
        self.transition_signature(id, AssetEvent::Clear)
    }

    fn transition_signature(&mut self, id: ElementId, event: AssetEvent) -> bool {
        let Some(slot) = self.signatures.get_mut(&id) else {
            tracing::debug!(%id, "no signature slot for element; ignoring asset event");
            return false;
        };
        let Ok(held) = slot.transition(event) else {
            return false;
        };
        if let Some(element) = self.template.element_mut(id) {
            element.set_signature_asset(held);
        }
        true
    }
}
