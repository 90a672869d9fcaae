//! Note use-case service.
//!
//! # Responsibility
//! - Provide note create/update/get/list/delete APIs.
//! - Enforce the note link rules the storage layer cannot see.
//!
//! # Invariants
//! - A note with a subcategory always carries the subcategory's
//!   owning category; a mismatch between the two is rejected.
//! - `category == None` forces `subcategory == None` ("unlisted").
//! - Empty titles never reach the store.

use crate::events::{ChangeHub, ChangeKind, StoreEvent};
use crate::model::category::CategoryId;
use crate::model::note::{Note, NoteId};
use crate::model::subcategory::SubcategoryId;
use crate::model::EntityKind;
use crate::query::NoteQuery;
use crate::repo::note_repo::NoteRepository;
use crate::repo::subcategory_repo::SubcategoryRepository;
use crate::service::{ServiceError, ServiceResult};

/// Note service facade over repository implementations.
pub struct NoteService<N, S> {
    notes: N,
    subcategories: S,
    hub: Option<ChangeHub>,
}

impl<N, S> NoteService<N, S>
where
    N: NoteRepository,
    S: SubcategoryRepository,
{
    /// Creates a service without change notifications.
    pub fn new(notes: N, subcategories: S) -> Self {
        Self {
            notes,
            subcategories,
            hub: None,
        }
    }

    /// Attaches a change hub; events fire after successful commits.
    pub fn with_hub(mut self, hub: ChangeHub) -> Self {
        self.hub = Some(hub);
        self
    }

    /// Creates one note, filed under the given links.
    ///
    /// A subcategory given without a category adopts the
    /// subcategory's parent; a subcategory under a different category
    /// than the given one is rejected.
    pub fn create_note(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
        category: Option<CategoryId>,
        subcategory: Option<SubcategoryId>,
    ) -> ServiceResult<Note> {
        let (category_uuid, subcategory_uuid) = self.resolve_links(category, subcategory)?;

        let mut note = Note::new(title, content);
        note.category_uuid = category_uuid;
        note.subcategory_uuid = subcategory_uuid;

        let id = self.notes.create(&note)?;
        let created = self.read_back(id, "created note not found in read-back")?;
        self.publish(StoreEvent::new(EntityKind::Note, ChangeKind::Created, id));
        Ok(created)
    }

    /// Replaces title, content and links of one note.
    ///
    /// Passing `category = None` moves the note to Unlisted and drops
    /// any subcategory link.
    pub fn update_note(
        &self,
        id: NoteId,
        title: impl Into<String>,
        content: impl Into<String>,
        category: Option<CategoryId>,
        subcategory: Option<SubcategoryId>,
    ) -> ServiceResult<Note> {
        let mut note = self
            .notes
            .get(id)?
            .ok_or(ServiceError::NotFound {
                kind: EntityKind::Note,
                id,
            })?;

        let (category_uuid, subcategory_uuid) = self.resolve_links(category, subcategory)?;
        note.title = title.into();
        note.content = content.into();
        note.category_uuid = category_uuid;
        note.subcategory_uuid = subcategory_uuid;

        self.notes.update(&note)?;
        let updated = self.read_back(id, "updated note not found in read-back")?;
        self.publish(StoreEvent::new(EntityKind::Note, ChangeKind::Updated, id));
        Ok(updated)
    }

    /// Deletes one note.
    pub fn delete_note(&self, id: NoteId) -> ServiceResult<()> {
        self.notes.delete(id)?;
        self.publish(StoreEvent::new(EntityKind::Note, ChangeKind::Deleted, id));
        Ok(())
    }

    /// Loads one note by id.
    pub fn get_note(&self, id: NoteId) -> ServiceResult<Option<Note>> {
        Ok(self.notes.get(id)?)
    }

    /// Lists notes matching one composite query.
    pub fn list_notes(&self, query: &NoteQuery) -> ServiceResult<Vec<Note>> {
        Ok(self.notes.list(query)?)
    }

    /// Counts notes matching one composite query.
    pub fn count_notes(&self, query: &NoteQuery) -> ServiceResult<u64> {
        Ok(self.notes.count(query)?)
    }

    /// Applies the link rules shared by create and update.
    fn resolve_links(
        &self,
        category: Option<CategoryId>,
        subcategory: Option<SubcategoryId>,
    ) -> ServiceResult<(Option<CategoryId>, Option<SubcategoryId>)> {
        let Some(subcategory_id) = subcategory else {
            return Ok((category, None));
        };

        let owner = self
            .subcategories
            .get(subcategory_id)?
            .ok_or(ServiceError::NotFound {
                kind: EntityKind::SubCategory,
                id: subcategory_id,
            })?;

        match category {
            None => Ok((Some(owner.category_uuid), Some(subcategory_id))),
            Some(category_id) if category_id == owner.category_uuid => {
                Ok((Some(category_id), Some(subcategory_id)))
            }
            Some(_) => Err(ServiceError::SubcategoryMismatch {
                subcategory: subcategory_id,
                expected_category: owner.category_uuid,
            }),
        }
    }

    fn read_back(&self, id: NoteId, details: &'static str) -> ServiceResult<Note> {
        self.notes
            .get(id)?
            .ok_or(ServiceError::InconsistentState(details))
    }

    fn publish(&self, event: StoreEvent) {
        if let Some(hub) = &self.hub {
            hub.publish(&event);
        }
    }
}
