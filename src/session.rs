//! An open editing session on one image.

use crate::ai::{AiClient, AiError, Assistant};
use crate::config::EditorSettings;
use crate::editor::AnnotationEditor;
use crate::model::{BoundingBox, BoxIdAllocator, ImageId, ImageRecord};

/// Proof that a session holds the store's single writer slot.
///
/// Not `Clone`: exactly one lease exists per open session, and it is given
/// back when the session is saved or discarded.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct EditLease {
    pub(crate) image: ImageId,
    pub(crate) token: u64,
}

/// Editor bound to an image checked out of a [`ResultStore`](crate::store::ResultStore).
///
/// Edits stay in the session until it is handed back with
/// [`ResultStore::save`](crate::store::ResultStore::save); dropping or
/// discarding it leaves the stored boxes untouched. A session that is simply
/// dropped keeps the store locked until
/// [`ResultStore::abandon_session`](crate::store::ResultStore::abandon_session).
#[derive(Debug)]
pub struct EditSession {
    lease: EditLease,
    image: ImageRecord,
    editor: AnnotationEditor,
}

impl EditSession {
    pub(crate) fn new(
        lease: EditLease,
        image: ImageRecord,
        boxes: Vec<BoundingBox>,
        ids: BoxIdAllocator,
        settings: &EditorSettings,
    ) -> Self {
        let editor = AnnotationEditor::open(&image, boxes, ids, settings);
        Self {
            lease,
            image,
            editor,
        }
    }

    pub fn image_id(&self) -> ImageId {
        self.image.id
    }

    pub fn image(&self) -> &ImageRecord {
        &self.image
    }

    pub fn editor(&self) -> &AnnotationEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut AnnotationEditor {
        &mut self.editor
    }

    /// Ask the assist collaborator for more boxes and merge them as
    /// `ai-assisted`. On failure the working set is left exactly as it was.
    ///
    /// Returns the number of boxes added.
    pub async fn request_assist<C: Assistant>(
        &mut self,
        client: &AiClient<C>,
        prompt: &str,
    ) -> Result<usize, AiError> {
        let suggestions = client
            .assist(&self.image, prompt, self.editor.boxes())
            .await?;
        Ok(self.editor.merge_assisted(suggestions))
    }

    pub(crate) fn into_parts(self) -> (EditLease, Vec<BoundingBox>, BoxIdAllocator) {
        let (boxes, ids) = self.editor.into_parts();
        (self.lease, boxes, ids)
    }

    pub(crate) fn into_lease(self) -> EditLease {
        self.lease
    }
}
