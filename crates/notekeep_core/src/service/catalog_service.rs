//! Category/subcategory edit surface.
//!
//! One parameterized service covers both grouping kinds: create,
//! rename/recolor, delete-with-cascade, listing and count summaries.
//!
//! # Invariants
//! - Deleting a subcategory reparents its notes to the owning category
//!   (`subcategory` cleared, `category` preserved).
//! - Deleting a category unlists every directly- and indirectly-owned
//!   note before removing its subcategories and itself.
//! - Reassigning a subcategory's parent re-links its notes so
//!   `note.category == subcategory.parent` stays true.

use crate::color::NoteColor;
use crate::events::{ChangeHub, ChangeKind, StoreEvent};
use crate::model::category::{Category, CategoryId};
use crate::model::subcategory::{Subcategory, SubcategoryId};
use crate::model::EntityKind;
use crate::query::{NoteQuery, NoteScope};
use crate::repo::category_repo::CategoryRepository;
use crate::repo::note_repo::NoteRepository;
use crate::repo::subcategory_repo::SubcategoryRepository;
use crate::service::{ServiceError, ServiceResult};
use log::info;

/// Per-category aggregate counts for sidebar rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    pub category: Category,
    /// Direct notes (no subcategory).
    pub note_count: u64,
    pub subcategory_count: u64,
    /// Direct notes plus notes of every owned subcategory.
    pub total_note_count: u64,
}

/// Result of a category delete cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryDeleteOutcome {
    pub notes_unlisted: usize,
    pub subcategories_deleted: usize,
}

/// Edit service for the grouping hierarchy.
pub struct CatalogService<C, S, N> {
    categories: C,
    subcategories: S,
    notes: N,
    hub: Option<ChangeHub>,
}

impl<C, S, N> CatalogService<C, S, N>
where
    C: CategoryRepository,
    S: SubcategoryRepository,
    N: NoteRepository,
{
    /// Creates a service without change notifications.
    pub fn new(categories: C, subcategories: S, notes: N) -> Self {
        Self {
            categories,
            subcategories,
            notes,
            hub: None,
        }
    }

    /// Attaches a change hub; events fire after successful commits.
    pub fn with_hub(mut self, hub: ChangeHub) -> Self {
        self.hub = Some(hub);
        self
    }

    /// Creates one category. Color defaults to palette blue.
    pub fn create_category(
        &self,
        name: impl Into<String>,
        color: Option<NoteColor>,
    ) -> ServiceResult<Category> {
        let category = Category::new(name, color);
        let id = self.categories.create(&category)?;
        let created = self
            .categories
            .get(id)?
            .ok_or(ServiceError::InconsistentState(
                "created category not found in read-back",
            ))?;
        self.publish(StoreEvent::new(EntityKind::Category, ChangeKind::Created, id));
        Ok(created)
    }

    /// Renames and optionally recolors one category.
    pub fn update_category(
        &self,
        id: CategoryId,
        name: impl Into<String>,
        color: Option<NoteColor>,
    ) -> ServiceResult<Category> {
        let mut category = self.require_category(id)?;
        category.name = name.into();
        if let Some(color) = color {
            category.color_hex = color.hex();
        }
        self.categories.update(&category)?;
        let updated = self
            .categories
            .get(id)?
            .ok_or(ServiceError::InconsistentState(
                "updated category not found in read-back",
            ))?;
        self.publish(StoreEvent::new(EntityKind::Category, ChangeKind::Updated, id));
        Ok(updated)
    }

    /// Deletes one category, unlisting its notes first.
    ///
    /// Every directly- or indirectly-owned note ends up with both
    /// links cleared; owned subcategories are removed.
    pub fn delete_category(&self, id: CategoryId) -> ServiceResult<CategoryDeleteOutcome> {
        self.require_category(id)?;

        let notes_unlisted = self.notes.unlist_for_category(id)?;
        let owned = self.subcategories.list_for_category(id)?;
        for subcategory in &owned {
            self.subcategories.delete(subcategory.uuid)?;
        }
        self.categories.delete(id)?;

        info!(
            "event=category_delete module=service status=ok id={id} notes_unlisted={notes_unlisted} subcategories_deleted={}",
            owned.len()
        );

        self.publish(StoreEvent::new(EntityKind::Category, ChangeKind::Deleted, id));
        if !owned.is_empty() {
            self.publish(StoreEvent::refreshed(EntityKind::SubCategory));
        }
        if notes_unlisted > 0 {
            self.publish(StoreEvent::refreshed(EntityKind::Note));
        }

        Ok(CategoryDeleteOutcome {
            notes_unlisted,
            subcategories_deleted: owned.len(),
        })
    }

    /// Creates one subcategory under `category_uuid`.
    ///
    /// Without an explicit color the parent's color is inherited.
    pub fn create_subcategory(
        &self,
        category_uuid: CategoryId,
        name: impl Into<String>,
        color: Option<NoteColor>,
    ) -> ServiceResult<Subcategory> {
        let parent = self.require_category(category_uuid)?;
        let subcategory = Subcategory::new(&parent, name, color);
        let id = self.subcategories.create(&subcategory)?;
        let created = self
            .subcategories
            .get(id)?
            .ok_or(ServiceError::InconsistentState(
                "created subcategory not found in read-back",
            ))?;
        self.publish(StoreEvent::new(
            EntityKind::SubCategory,
            ChangeKind::Created,
            id,
        ));
        Ok(created)
    }

    /// Renames, recolors and/or reassigns one subcategory.
    ///
    /// Reassigning the parent also re-links the subcategory's notes to
    /// the new owning category.
    pub fn update_subcategory(
        &self,
        id: SubcategoryId,
        name: impl Into<String>,
        color: Option<NoteColor>,
        new_parent: Option<CategoryId>,
    ) -> ServiceResult<Subcategory> {
        let mut subcategory = self.require_subcategory(id)?;
        subcategory.name = name.into();
        if let Some(color) = color {
            subcategory.color_hex = color.hex();
        }

        let reassigned = match new_parent {
            Some(parent_id) if parent_id != subcategory.category_uuid => {
                self.require_category(parent_id)?;
                subcategory.category_uuid = parent_id;
                true
            }
            _ => false,
        };

        self.subcategories.update(&subcategory)?;
        if reassigned {
            let moved = self
                .notes
                .relink_subcategory_notes(id, subcategory.category_uuid)?;
            if moved > 0 {
                self.publish(StoreEvent::refreshed(EntityKind::Note));
            }
        }

        let updated = self
            .subcategories
            .get(id)?
            .ok_or(ServiceError::InconsistentState(
                "updated subcategory not found in read-back",
            ))?;
        self.publish(StoreEvent::new(
            EntityKind::SubCategory,
            ChangeKind::Updated,
            id,
        ));
        Ok(updated)
    }

    /// Deletes one subcategory, reparenting its notes to the owning
    /// category. Returns the number of notes moved.
    pub fn delete_subcategory(&self, id: SubcategoryId) -> ServiceResult<usize> {
        self.require_subcategory(id)?;

        let notes_moved = self.notes.detach_subcategory(id)?;
        self.subcategories.delete(id)?;

        info!(
            "event=subcategory_delete module=service status=ok id={id} notes_moved={notes_moved}"
        );

        self.publish(StoreEvent::new(
            EntityKind::SubCategory,
            ChangeKind::Deleted,
            id,
        ));
        if notes_moved > 0 {
            self.publish(StoreEvent::refreshed(EntityKind::Note));
        }
        Ok(notes_moved)
    }

    /// Lists all categories sorted by name.
    pub fn list_categories(&self) -> ServiceResult<Vec<Category>> {
        Ok(self.categories.list()?)
    }

    /// Lists one category's subcategories sorted by name.
    pub fn list_subcategories(
        &self,
        category_uuid: CategoryId,
    ) -> ServiceResult<Vec<Subcategory>> {
        Ok(self.subcategories.list_for_category(category_uuid)?)
    }

    /// Aggregate counts for every category.
    pub fn category_summaries(&self) -> ServiceResult<Vec<CategorySummary>> {
        let mut summaries = Vec::new();
        for category in self.categories.list()? {
            let direct = self
                .notes
                .count(&NoteQuery::scoped(NoteScope::Category(category.uuid)))?;
            let subcategories = self.subcategories.list_for_category(category.uuid)?;
            let mut total = direct;
            for subcategory in &subcategories {
                total += self
                    .notes
                    .count(&NoteQuery::scoped(NoteScope::Subcategory(subcategory.uuid)))?;
            }
            summaries.push(CategorySummary {
                category,
                note_count: direct,
                subcategory_count: subcategories.len() as u64,
                total_note_count: total,
            });
        }
        Ok(summaries)
    }

    fn require_category(&self, id: CategoryId) -> ServiceResult<Category> {
        self.categories.get(id)?.ok_or(ServiceError::NotFound {
            kind: EntityKind::Category,
            id,
        })
    }

    fn require_subcategory(&self, id: SubcategoryId) -> ServiceResult<Subcategory> {
        self.subcategories.get(id)?.ok_or(ServiceError::NotFound {
            kind: EntityKind::SubCategory,
            id,
        })
    }

    fn publish(&self, event: StoreEvent) {
        if let Some(hub) = &self.hub {
            hub.publish(&event);
        }
    }
}
