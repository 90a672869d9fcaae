use notekeep_core::db::open_db_in_memory;
use notekeep_core::{
    CatalogService, NoteColor, NoteQuery, NoteScope, NoteService, ServiceError,
    SqliteCategoryRepository, SqliteNoteRepository, SqliteSubcategoryRepository, ValidationError,
    DEFAULT_COLOR_HEX,
};
use rusqlite::Connection;
use uuid::Uuid;

fn catalog(
    conn: &Connection,
) -> CatalogService<
    SqliteCategoryRepository<'_>,
    SqliteSubcategoryRepository<'_>,
    SqliteNoteRepository<'_>,
> {
    CatalogService::new(
        SqliteCategoryRepository::try_new(conn).unwrap(),
        SqliteSubcategoryRepository::try_new(conn).unwrap(),
        SqliteNoteRepository::try_new(conn).unwrap(),
    )
}

fn note_service(
    conn: &Connection,
) -> NoteService<SqliteNoteRepository<'_>, SqliteSubcategoryRepository<'_>> {
    NoteService::new(
        SqliteNoteRepository::try_new(conn).unwrap(),
        SqliteSubcategoryRepository::try_new(conn).unwrap(),
    )
}

#[test]
fn create_category_defaults_to_palette_blue() {
    let conn = open_db_in_memory().unwrap();
    let service = catalog(&conn);

    let category = service.create_category("Work", None).unwrap();
    assert_eq!(category.color_hex, DEFAULT_COLOR_HEX);
    assert!(category.created_at > 0);
    assert_eq!(category.created_at, category.updated_at);

    let listed = service.list_categories().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Work");
}

#[test]
fn empty_names_are_rejected_before_the_store() {
    let conn = open_db_in_memory().unwrap();
    let service = catalog(&conn);

    let err = service.create_category("   ", None).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::EmptyName(_))
    ));
    assert!(service.list_categories().unwrap().is_empty());

    let category = service.create_category("Work", None).unwrap();
    let err = service.update_category(category.uuid, "", None).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::EmptyName(_))
    ));
}

#[test]
fn update_category_renames_and_recolors() {
    let conn = open_db_in_memory().unwrap();
    let service = catalog(&conn);

    let category = service.create_category("Work", None).unwrap();
    let updated = service
        .update_category(category.uuid, "Projects", Some(NoteColor::Red))
        .unwrap();

    assert_eq!(updated.name, "Projects");
    assert_eq!(updated.color_hex, "FF0000");
    assert_eq!(updated.uuid, category.uuid);
}

#[test]
fn missing_targets_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = catalog(&conn);

    let err = service
        .update_category(Uuid::new_v4(), "Anything", None)
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));

    let err = service.delete_subcategory(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));
}

#[test]
fn subcategory_inherits_parent_color_when_unspecified() {
    let conn = open_db_in_memory().unwrap();
    let service = catalog(&conn);

    let category = service
        .create_category("Work", Some(NoteColor::Purple))
        .unwrap();
    let inherited = service
        .create_subcategory(category.uuid, "Reports", None)
        .unwrap();
    assert_eq!(inherited.color_hex, "800080");

    let explicit = service
        .create_subcategory(category.uuid, "Meetings", Some(NoteColor::Yellow))
        .unwrap();
    assert_eq!(explicit.color_hex, "FFFF00");
}

#[test]
fn delete_subcategory_reparents_notes_to_owning_category() {
    let conn = open_db_in_memory().unwrap();
    let service = catalog(&conn);
    let notes = note_service(&conn);

    let category = service.create_category("Work", None).unwrap();
    let subcategory = service
        .create_subcategory(category.uuid, "Reports", None)
        .unwrap();

    let first = notes
        .create_note("Q1 report", "", None, Some(subcategory.uuid))
        .unwrap();
    let second = notes
        .create_note("Q2 report", "", None, Some(subcategory.uuid))
        .unwrap();
    assert_eq!(first.category_uuid, Some(category.uuid));
    assert_eq!(second.subcategory_uuid, Some(subcategory.uuid));

    let moved = service.delete_subcategory(subcategory.uuid).unwrap();
    assert_eq!(moved, 2);

    for id in [first.uuid, second.uuid] {
        let note = notes.get_note(id).unwrap().unwrap();
        assert_eq!(note.category_uuid, Some(category.uuid));
        assert_eq!(note.subcategory_uuid, None);
    }

    assert!(service
        .list_subcategories(category.uuid)
        .unwrap()
        .is_empty());
    let in_scope = notes
        .list_notes(&NoteQuery::scoped(NoteScope::Subcategory(subcategory.uuid)))
        .unwrap();
    assert!(in_scope.is_empty());
}

#[test]
fn delete_category_unlists_direct_and_subcategory_notes() {
    let conn = open_db_in_memory().unwrap();
    let service = catalog(&conn);
    let notes = note_service(&conn);

    let category = service.create_category("Work", None).unwrap();
    let subcategory = service
        .create_subcategory(category.uuid, "Reports", None)
        .unwrap();
    let direct = notes
        .create_note("Direct", "", Some(category.uuid), None)
        .unwrap();
    let nested = notes
        .create_note("Nested", "", None, Some(subcategory.uuid))
        .unwrap();

    let outcome = service.delete_category(category.uuid).unwrap();
    assert_eq!(outcome.notes_unlisted, 2);
    assert_eq!(outcome.subcategories_deleted, 1);

    for id in [direct.uuid, nested.uuid] {
        let note = notes.get_note(id).unwrap().unwrap();
        assert!(note.is_unlisted());
        assert_eq!(note.subcategory_uuid, None);
    }
    assert!(service.list_categories().unwrap().is_empty());

    let unlisted = notes
        .list_notes(&NoteQuery::scoped(NoteScope::Unlisted))
        .unwrap();
    assert_eq!(unlisted.len(), 2);
}

#[test]
fn reassigning_subcategory_parent_relinks_its_notes() {
    let conn = open_db_in_memory().unwrap();
    let service = catalog(&conn);
    let notes = note_service(&conn);

    let work = service.create_category("Work", None).unwrap();
    let home = service.create_category("Home", None).unwrap();
    let subcategory = service
        .create_subcategory(work.uuid, "Errands", None)
        .unwrap();
    let note = notes
        .create_note("Renew passport", "", None, Some(subcategory.uuid))
        .unwrap();
    assert_eq!(note.category_uuid, Some(work.uuid));

    let moved = service
        .update_subcategory(subcategory.uuid, "Errands", None, Some(home.uuid))
        .unwrap();
    assert_eq!(moved.category_uuid, home.uuid);

    let relinked = notes.get_note(note.uuid).unwrap().unwrap();
    assert_eq!(relinked.category_uuid, Some(home.uuid));
    assert_eq!(relinked.subcategory_uuid, Some(subcategory.uuid));
}

#[test]
fn note_link_invariants_hold_through_the_public_api() {
    let conn = open_db_in_memory().unwrap();
    let service = catalog(&conn);
    let notes = note_service(&conn);

    let work = service.create_category("Work", None).unwrap();
    let home = service.create_category("Home", None).unwrap();
    let subcategory = service
        .create_subcategory(work.uuid, "Reports", None)
        .unwrap();

    // Subcategory without a category adopts the subcategory's parent.
    let adopted = notes
        .create_note("Adopted", "", None, Some(subcategory.uuid))
        .unwrap();
    assert_eq!(adopted.category_uuid, Some(work.uuid));

    // Subcategory under a different category is rejected.
    let err = notes
        .create_note("Bad link", "", Some(home.uuid), Some(subcategory.uuid))
        .unwrap_err();
    assert!(matches!(err, ServiceError::SubcategoryMismatch { .. }));

    // Moving to Unlisted clears both links.
    let unlisted = notes
        .update_note(adopted.uuid, "Adopted", "", None, None)
        .unwrap();
    assert!(unlisted.is_unlisted());
    assert_eq!(unlisted.subcategory_uuid, None);

    // Empty titles never reach the store.
    let err = notes.create_note("  ", "", None, None).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::EmptyTitle)
    ));
}

#[test]
fn category_summaries_count_direct_and_nested_notes() {
    let conn = open_db_in_memory().unwrap();
    let service = catalog(&conn);
    let notes = note_service(&conn);

    let work = service.create_category("Work", None).unwrap();
    let subcategory = service
        .create_subcategory(work.uuid, "Reports", None)
        .unwrap();
    service.create_category("Empty", None).unwrap();

    notes
        .create_note("Direct", "", Some(work.uuid), None)
        .unwrap();
    notes
        .create_note("Nested", "", None, Some(subcategory.uuid))
        .unwrap();
    notes.create_note("Unlisted", "", None, None).unwrap();

    let summaries = service.category_summaries().unwrap();
    assert_eq!(summaries.len(), 2);

    // Sorted by name: Empty before Work.
    assert_eq!(summaries[0].category.name, "Empty");
    assert_eq!(summaries[0].total_note_count, 0);

    assert_eq!(summaries[1].category.name, "Work");
    assert_eq!(summaries[1].note_count, 1);
    assert_eq!(summaries[1].subcategory_count, 1);
    assert_eq!(summaries[1].total_note_count, 2);
}
